use alloy_primitives::TxHash;
use bon::Builder;
use tracing::{debug, info, warn, Instrument};

use super::config::PollingConfig;
use crate::error::{FinalizerError, Result};
use crate::protocol::RelayStatus;
use crate::spans;
use crate::traits::{Clock, StatusOracle};

/// Waits for an OP Stack withdrawal to reach a lifecycle stage
///
/// Only observes: the tracker never advances the withdrawal itself.
#[derive(Builder, Clone, Debug)]
pub struct MessageStatusTracker<O: StatusOracle, C: Clock> {
    oracle: O,
    clock: C,
    #[builder(default = PollingConfig::status())]
    polling: PollingConfig,
}

impl<O: StatusOracle, C: Clock> MessageStatusTracker<O, C> {
    /// Polls until the withdrawal's status is at least `target`
    ///
    /// Returns the status observed, which may be past `target`. A status lower
    /// than one already seen is logged and polling continues.
    ///
    /// # Errors
    ///
    /// - [`FinalizerError::StatusWaitFailed`] wrapping any oracle failure
    /// - [`FinalizerError::PollingDeadlineExceeded`] once `max_wait_secs` elapsed
    pub async fn advance_to(
        &self,
        tx_hash: TxHash,
        log_index: u64,
        target: RelayStatus,
    ) -> Result<RelayStatus> {
        let span = spans::advance_to(tx_hash, log_index, target);

        async {
            let result = self.wait(tx_hash, log_index, target).await;
            match &result {
                Ok(observed) => {
                    tracing::Span::current().record("observed", observed.as_str());
                }
                Err(e) => spans::record_error(e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn wait(
        &self,
        tx_hash: TxHash,
        log_index: u64,
        target: RelayStatus,
    ) -> Result<RelayStatus> {
        let started = self.clock.now();
        let mut highest: Option<RelayStatus> = None;

        loop {
            let status = self
                .oracle
                .message_status(tx_hash, log_index)
                .await
                .map_err(|e| FinalizerError::StatusWaitFailed {
                    reason: e.to_string(),
                })?;

            if let Some(seen) = highest.filter(|seen| status < *seen) {
                warn!(
                    observed = %status,
                    previously_observed = %seen,
                    event = "withdrawal_status_regressed"
                );
            } else {
                highest = Some(status);
            }

            if status >= target {
                info!(observed = %status, event = "withdrawal_status_reached");
                return Ok(status);
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if self.polling.is_expired(elapsed) {
                return Err(FinalizerError::PollingDeadlineExceeded {
                    operation: "withdrawal status",
                    waited_secs: elapsed.as_secs(),
                });
            }

            debug!(
                observed = %status,
                poll_interval_secs = self.polling.poll_interval_secs,
                event = "withdrawal_status_pending"
            );
            self.clock.sleep(self.polling.poll_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, FakeStatusOracle};
    use rstest::rstest;
    use std::time::Duration;

    fn tracker(
        oracle: &FakeStatusOracle,
        clock: &FakeClock,
    ) -> MessageStatusTracker<FakeStatusOracle, FakeClock> {
        MessageStatusTracker::builder()
            .oracle(oracle.clone())
            .clock(clock.clone())
            .build()
    }

    #[tokio::test]
    async fn test_waits_until_target() {
        let oracle = FakeStatusOracle::new(vec![
            RelayStatus::Submitted,
            RelayStatus::Submitted,
            RelayStatus::ReadyToProve,
        ]);
        let clock = FakeClock::new();

        let observed = tracker(&oracle, &clock)
            .advance_to(TxHash::ZERO, 0, RelayStatus::ReadyToProve)
            .await
            .unwrap();

        assert_eq!(observed, RelayStatus::ReadyToProve);
        assert_eq!(oracle.call_count(), 3);
        assert_eq!(clock.elapsed(), Duration::from_secs(8));
    }

    #[rstest]
    #[case(RelayStatus::ReadyToProve, RelayStatus::Proven)]
    #[case(RelayStatus::ReadyForRelay, RelayStatus::Relayed)]
    #[case(RelayStatus::Submitted, RelayStatus::Finalized)]
    #[tokio::test]
    async fn test_returns_immediately_when_past_target(
        #[case] target: RelayStatus,
        #[case] current: RelayStatus,
    ) {
        let oracle = FakeStatusOracle::new(vec![current]);
        let clock = FakeClock::new();

        let observed = tracker(&oracle, &clock)
            .advance_to(TxHash::ZERO, 0, target)
            .await
            .unwrap();

        assert_eq!(observed, current);
        assert_eq!(clock.sleep_count(), 0);
    }

    #[tokio::test]
    async fn test_regression_is_tolerated() {
        let oracle = FakeStatusOracle::new(vec![
            RelayStatus::Proven,
            RelayStatus::ReadyToProve,
            RelayStatus::ReadyForRelay,
        ]);
        let clock = FakeClock::new();

        let observed = tracker(&oracle, &clock)
            .advance_to(TxHash::ZERO, 0, RelayStatus::ReadyForRelay)
            .await
            .unwrap();

        assert_eq!(observed, RelayStatus::ReadyForRelay);
        assert_eq!(oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_wrapped() {
        let oracle = FakeStatusOracle::failing("header not found");
        let clock = FakeClock::new();

        let err = tracker(&oracle, &clock)
            .advance_to(TxHash::ZERO, 0, RelayStatus::ReadyToProve)
            .await
            .unwrap_err();

        insta::assert_snapshot!(err, @"Waiting for message status failed: Provider error: header not found");
    }

    #[tokio::test]
    async fn test_deadline() {
        let oracle = FakeStatusOracle::new(vec![RelayStatus::Submitted]);
        let clock = FakeClock::new();

        let err = MessageStatusTracker::builder()
            .oracle(oracle.clone())
            .clock(clock.clone())
            .polling(PollingConfig::status().with_max_wait_secs(10))
            .build()
            .advance_to(TxHash::ZERO, 0, RelayStatus::ReadyToProve)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FinalizerError::PollingDeadlineExceeded {
                waited_secs: 12,
                ..
            }
        ));
        assert_eq!(oracle.call_count(), 4);
    }
}
