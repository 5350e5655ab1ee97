//! # Engine Configuration
//!
//! Typed configuration for pacing, retry, and queue behavior. Hard defaults
//! live in [`crate::constants::defaults`]; deployments override them through
//! `CAMPAIGN__*` environment variables (e.g. `CAMPAIGN__PACING__INTER_CONTACT_DELAY_MS=250`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::defaults;
use crate::error::{EngineError, Result};

/// Spacing applied between contacts and between channel sends.
///
/// The inter-contact delay is the primary throttle against provider rate
/// limits and must stay tunable rather than hardcoded at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub inter_contact_delay_ms: u64,
    pub inter_channel_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_contact_delay_ms: defaults::INTER_CONTACT_DELAY_MS,
            inter_channel_delay_ms: defaults::INTER_CHANNEL_DELAY_MS,
        }
    }
}

impl PacingConfig {
    pub fn inter_contact_delay(&self) -> Duration {
        Duration::from_millis(self.inter_contact_delay_ms)
    }

    pub fn inter_channel_delay(&self) -> Duration {
        Duration::from_millis(self.inter_channel_delay_ms)
    }
}

/// Retry/backoff rules applied to queued jobs (not to channel sends)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_seconds: u64,
    pub backoff_multiplier: f64,
    pub max_delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_JOB_ATTEMPTS,
            base_delay_seconds: defaults::RETRY_BASE_DELAY_SECONDS,
            backoff_multiplier: defaults::RETRY_BACKOFF_MULTIPLIER,
            max_delay_seconds: defaults::MAX_RETRY_DELAY_SECONDS,
        }
    }
}

/// Queue worker tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub visibility_timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub ordering_retry_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_seconds: defaults::VISIBILITY_TIMEOUT_SECONDS,
            poll_interval_ms: defaults::WORKER_POLL_INTERVAL_MS,
            ordering_retry_delay_ms: defaults::ORDERING_RETRY_DELAY_MS,
        }
    }
}

impl QueueConfig {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ordering_retry_delay(&self) -> Duration {
        Duration::from_millis(self.ordering_retry_delay_ms)
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
    pub queue: QueueConfig,
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("CAMPAIGN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| EngineError::ConfigurationError(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| EngineError::ConfigurationError(e.to_string()))
    }

    /// Configuration with near-zero pacing, for tests that drive full runs
    pub fn fast() -> Self {
        Self {
            pacing: PacingConfig {
                inter_contact_delay_ms: 1,
                inter_channel_delay_ms: 0,
            },
            retry: RetryConfig {
                base_delay_seconds: 0,
                ..RetryConfig::default()
            },
            queue: QueueConfig {
                poll_interval_ms: 1,
                ordering_retry_delay_ms: 1,
                ..QueueConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_defaults() {
        let config = PacingConfig::default();
        assert_eq!(config.inter_contact_delay_ms, 1000);
        assert_eq!(config.inter_channel_delay_ms, 500);
        assert_eq!(config.inter_contact_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_retry_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_seconds, 2);
        assert_eq!(config.backoff_multiplier, 2.0);
        assert_eq!(config.max_delay_seconds, 60);
    }

    #[test]
    fn test_engine_config_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_fast_config_is_quick() {
        let config = EngineConfig::fast();
        assert!(config.pacing.inter_contact_delay_ms <= 1);
        assert_eq!(config.retry.base_delay_seconds, 0);
    }
}
