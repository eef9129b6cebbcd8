use std::time::Duration;

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
///
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v1 attestation API path
pub const ATTESTATION_PATH_V1: &str = "/v1/attestations/";

/// Configuration for a polling loop.
///
/// Shared by the attestation poller, the source receipt wait and the withdrawal
/// status tracker. Loops are unbounded unless a maximum wait is set.
///
/// # Examples
///
/// ```rust
/// use bridge_finalizer::PollingConfig;
///
/// // Attestation defaults: every 5 seconds, no deadline
/// let config = PollingConfig::default();
/// assert_eq!(config.poll_interval_secs, 5);
/// assert_eq!(config.max_wait_secs, None);
///
/// // Status tracking preset, bounded to one hour
/// let config = PollingConfig::status().with_max_wait_secs(3600);
/// assert_eq!(config.poll_interval_secs, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Seconds to wait between polling attempts.
    pub poll_interval_secs: u64,
    /// Give up once this many seconds have elapsed since the first attempt.
    pub max_wait_secs: Option<u64>,
}

impl Default for PollingConfig {
    /// Polls every 5 seconds, forever.
    ///
    /// Matches the cadence used for attestation polling.
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_wait_secs: None,
        }
    }
}

impl PollingConfig {
    /// Preset for waiting on chain state: receipts and withdrawal status.
    ///
    /// - `poll_interval_secs`: 4
    /// - `max_wait_secs`: none
    pub fn status() -> Self {
        Self {
            poll_interval_secs: 4,
            max_wait_secs: None,
        }
    }

    /// Sets the interval between polling attempts in seconds.
    ///
    /// ```rust
    /// use bridge_finalizer::PollingConfig;
    ///
    /// let config = PollingConfig::default().with_poll_interval_secs(30);
    /// assert_eq!(config.poll_interval_secs, 30);
    /// ```
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Bounds the loop: once `secs` have elapsed it fails with
    /// [`FinalizerError::PollingDeadlineExceeded`](crate::FinalizerError::PollingDeadlineExceeded).
    pub fn with_max_wait_secs(mut self, secs: u64) -> Self {
        self.max_wait_secs = Some(secs);
        self
    }

    /// Removes any deadline.
    pub fn unbounded(mut self) -> Self {
        self.max_wait_secs = None;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }

    /// True once `elapsed` has reached the deadline, never for unbounded loops.
    pub fn is_expired(&self, elapsed: Duration) -> bool {
        self.max_wait().is_some_and(|max_wait| elapsed >= max_wait)
    }
}
