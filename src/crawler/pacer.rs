//! Randomized pacing between remote interactions
//!
//! Every pagination click is preceded by a uniformly random pause so the
//! request rhythm doesn't look scripted.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Returns a delay uniformly distributed in `[min_ms, max_ms)`
///
/// Equal bounds (or inverted ones) yield exactly `min_ms`.
pub fn random_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..max_ms))
}

/// Produces pacing delays within a fixed range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    /// Creates a pacer for `[min_ms, max_ms)`
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Creates a pacer from the `[pacing]` section
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.min_delay, config.max_delay)
    }

    /// Returns the next delay
    pub fn delay(&self) -> Duration {
        random_delay(self.min_ms, self.max_ms)
    }

    /// Sleeps for one delay
    ///
    /// # Returns
    ///
    /// `false` if `cancel` fired before the delay elapsed
    pub async fn pause(&self, cancel: &CancellationToken) -> bool {
        let delay = self.delay();
        tracing::info!("Waiting for {} seconds before clicking next...", delay.as_secs());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

impl Default for Pacer {
    /// General-purpose pacing of 0.5 to 2 seconds
    fn default() -> Self {
        Self::new(500, 2_000)
    }
}
