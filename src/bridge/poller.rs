use alloy_primitives::Bytes;
use bon::Builder;
use std::time::Instant;
use tracing::{debug, error, info, Instrument};

use super::config::PollingConfig;
use crate::error::{FinalizerError, Result};
use crate::protocol::{AttestationStatus, MessageHash};
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Polls the attestation service until a message is attested
///
/// One query per cycle, `polling.poll_interval()` apart, no deadline unless
/// `polling.max_wait_secs` is set. Dropping the returned future stops the loop.
#[derive(Builder, Clone, Debug)]
pub struct AttestationPoller<A: AttestationProvider, C: Clock> {
    attestation_provider: A,
    clock: C,
    #[builder(default)]
    polling: PollingConfig,
}

impl<A: AttestationProvider, C: Clock> AttestationPoller<A, C> {
    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    /// Waits until `message_hash` is attested and returns the attestation bytes
    ///
    /// # Errors
    ///
    /// - [`FinalizerError::MessageNotFound`] on the first "not found" answer,
    ///   without retrying
    /// - [`FinalizerError::AttestationFailed`] if the service reports failure, or
    ///   completes without attestation bytes
    /// - [`FinalizerError::PollingDeadlineExceeded`] once `max_wait_secs` elapsed
    /// - Any other provider error, unchanged. Rate limiting is not an error: the
    ///   poller sleeps for the advertised period and asks again.
    pub async fn await_attestation(&self, message_hash: MessageHash) -> Result<Bytes> {
        let span = spans::await_attestation(
            &message_hash,
            self.polling.poll_interval_secs,
            self.polling.max_wait_secs,
        );

        async {
            let result = self.poll(message_hash).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll(&self, message_hash: MessageHash) -> Result<Bytes> {
        let started = self.clock.now();
        let mut attempt: u32 = 0;

        info!(event = "attestation_polling_started");

        loop {
            attempt += 1;
            let response = match self
                .attestation_provider
                .get_attestation(message_hash)
                .instrument(spans::get_attestation(attempt))
                .await
            {
                Ok(response) => response,
                Err(FinalizerError::RateLimitExceeded {
                    retry_after_seconds,
                }) => {
                    debug!(
                        retry_after_seconds,
                        attempt,
                        event = "attestation_rate_limited"
                    );
                    self.ensure_within_deadline(started)?;
                    self.clock
                        .sleep(std::time::Duration::from_secs(retry_after_seconds))
                        .await;
                    continue;
                }
                Err(e) => {
                    error!(error = %e, attempt, event = "attestation_request_failed");
                    return Err(e);
                }
            };

            let Some(response) = response else {
                error!(attempt, event = "attestation_message_not_found");
                return Err(FinalizerError::MessageNotFound {
                    message_hash: message_hash.to_string(),
                });
            };

            match response.status {
                AttestationStatus::Complete => {
                    let attestation = response.attestation.ok_or_else(|| {
                        spans::record_error_with_context(
                            "AttestationDataMissing",
                            "Attestation status is complete but attestation field is null",
                            Some("This indicates an unexpected API response format"),
                        );
                        FinalizerError::AttestationFailed {
                            reason: "Attestation missing".to_string(),
                        }
                    })?;

                    info!(
                        attempt,
                        attestation_length_bytes = attestation.len(),
                        event = "attestation_complete"
                    );
                    return Ok(attestation);
                }
                AttestationStatus::Failed => {
                    error!(attempt, event = "attestation_failed");
                    return Err(FinalizerError::AttestationFailed {
                        reason: "Attestation service reported failure".to_string(),
                    });
                }
                AttestationStatus::Pending | AttestationStatus::PendingConfirmations => {
                    debug!(
                        status = ?response.status,
                        attempt,
                        poll_interval_secs = self.polling.poll_interval_secs,
                        event = "attestation_pending"
                    );
                    self.ensure_within_deadline(started)?;
                    self.clock.sleep(self.polling.poll_interval()).await;
                }
            }
        }
    }

    fn ensure_within_deadline(&self, started: Instant) -> Result<()> {
        let elapsed = self.clock.now().saturating_duration_since(started);
        if self.polling.is_expired(elapsed) {
            error!(
                waited_secs = elapsed.as_secs(),
                event = "attestation_polling_deadline_exceeded"
            );
            return Err(FinalizerError::PollingDeadlineExceeded {
                operation: "attestation",
                waited_secs: elapsed.as_secs(),
            });
        }
        Ok(())
    }
}
