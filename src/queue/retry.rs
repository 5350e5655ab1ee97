//! Retry/backoff rules for queued jobs. Applies to job-level failures only;
//! channel-send failures are absorbed by the Contact Processor as terminal
//! per-attempt outcomes and never retried here.

use std::time::Duration;

use crate::config::RetryConfig;

/// Exponential backoff with a fixed attempt ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_secs(config.base_delay_seconds),
            multiplier: config.backoff_multiplier,
            max_delay: Duration::from_secs(config.max_delay_seconds),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a job that has already failed `retry_count + 1` deliveries
    /// may be attempted again
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count + 1 < self.max_attempts
    }

    /// Delay before the delivery with the given retry count:
    /// `base × multiplier^retry_count`, capped at the configured maximum
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let factor = self.multiplier.powi(retry_count as i32);
        let delay = self.base_delay.mul_f64(factor.max(0.0));
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}
