//! Wall clock for production polling loops.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// [`Clock`] backed by the system clock and Tokio's timer.
///
/// Polling loops sleep on this in production; tests substitute
/// [`FakeClock`](crate::testing::FakeClock) to skip the waiting.
///
/// ```rust
/// use bridge_finalizer::providers::TokioClock;
///
/// let clock = TokioClock;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_uses_tokio_timer() {
        let before = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_secs(60)).await;

        assert!(tokio::time::Instant::now() - before >= Duration::from_secs(60));
    }
}
