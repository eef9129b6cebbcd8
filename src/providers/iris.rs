//! Circle Iris API attestation provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::bridge::{ATTESTATION_PATH_V1, IRIS_API, IRIS_API_SANDBOX};
use crate::error::{FinalizerError, Result};
use crate::protocol::{AttestationResponse, MessageHash};
use crate::traits::AttestationProvider;

/// Fallback when a 429 carries no usable `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 300;

/// Production attestation provider using Circle's Iris API.
///
/// A 404 is the service's answer for a message it has never seen and is
/// returned as `Ok(None)`.
///
/// # Examples
///
/// ```rust,no_run
/// use bridge_finalizer::providers::IrisAttestationProvider;
/// use bridge_finalizer::AttestationProvider;
/// use alloy_primitives::FixedBytes;
///
/// # async fn example() -> Result<(), bridge_finalizer::FinalizerError> {
/// let provider = IrisAttestationProvider::production()?;
/// let message_hash: FixedBytes<32> = [0u8; 32].into();
/// let response = provider.get_attestation(message_hash).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: Url,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a new Iris attestation provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the Iris API (e.g., <https://iris-api.circle.com>)
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FinalizerError::Network)?;
        Ok(Self { base_url, client })
    }

    /// Creates a provider for Circle's production environment.
    pub fn production() -> Result<Self> {
        Self::new(parse_base(IRIS_API)?)
    }

    /// Creates a provider for Circle's sandbox (testnet) environment.
    pub fn sandbox() -> Result<Self> {
        Self::new(parse_base(IRIS_API_SANDBOX)?)
    }

    /// Constructs the full API URL for a given message hash.
    pub fn attestation_url(&self, message_hash: MessageHash) -> Result<Url> {
        self.base_url
            .join(&format!("{ATTESTATION_PATH_V1}{message_hash}"))
            .map_err(|e| FinalizerError::InvalidUrl {
                reason: format!("Failed to construct attestation URL: {e}"),
            })
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| FinalizerError::InvalidUrl {
        reason: format!("{raw}: {e}"),
    })
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(message_hash = %message_hash))]
    async fn get_attestation(
        &self,
        message_hash: MessageHash,
    ) -> Result<Option<AttestationResponse>> {
        let url = self.attestation_url(message_hash)?;
        trace!(url = %url, event = "attestation_request_sent");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FinalizerError::Network)?;

        let status_code = response.status();
        trace!(status_code = %status_code, event = "attestation_response_received");

        if status_code == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            debug!(
                retry_after_seconds = retry_after,
                event = "attestation_rate_limited"
            );
            return Err(FinalizerError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            });
        }

        if status_code == StatusCode::NOT_FOUND {
            debug!(event = "attestation_not_found");
            return Ok(None);
        }

        response.error_for_status_ref()?;

        let body = response.text().await.map_err(FinalizerError::Network)?;
        let attestation: AttestationResponse = serde_json::from_str(&body)?;
        debug!(status = ?attestation.status, event = "attestation_response_parsed");

        Ok(Some(attestation))
    }
}
