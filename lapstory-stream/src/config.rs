//! Stream client configuration

use crate::backoff::Backoff;
use crate::error::{StreamError, StreamResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 500;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.6;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;

/// Timing and retry settings for a `StreamClient`
///
/// Every field is optional in JSON; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamConfig {
    pub heartbeat_interval_ms: u64,
    pub base_backoff_ms: u64,
    pub backoff_factor: f64,
    pub max_backoff_ms: u64,
    /// Reconnect attempts allowed after a failure; `None` retries forever
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_reconnect_attempts: None,
        }
    }
}

/// How many reconnects to attempt before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Unlimited,
    MaxAttempts(u32),
}

impl RetryPolicy {
    /// Whether another reconnect may follow `attempts` failed ones
    pub fn allows(&self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unlimited => true,
            RetryPolicy::MaxAttempts(max) => attempts < *max,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> StreamResult<()> {
        if self.heartbeat_interval_ms == 0 {
            return Err(StreamError::InvalidConfig(
                "heartbeatIntervalMs must be greater than 0".to_string(),
            ));
        }
        if self.base_backoff_ms == 0 {
            return Err(StreamError::InvalidConfig(
                "baseBackoffMs must be greater than 0".to_string(),
            ));
        }
        if self.base_backoff_ms > self.max_backoff_ms {
            return Err(StreamError::InvalidConfig(format!(
                "baseBackoffMs ({}) exceeds maxBackoffMs ({})",
                self.base_backoff_ms, self.max_backoff_ms
            )));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(StreamError::InvalidConfig(format!(
                "backoffFactor must be a finite value >= 1.0, got {}",
                self.backoff_factor
            )));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.max_reconnect_attempts {
            Some(max) => RetryPolicy::MaxAttempts(max),
            None => RetryPolicy::Unlimited,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.base_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(15));
        assert_eq!(config.retry_policy(), RetryPolicy::Unlimited);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: StreamConfig =
            serde_json::from_str(r#"{"baseBackoffMs": 250, "maxReconnectAttempts": 5}"#).unwrap();
        assert_eq!(config.base_backoff_ms, 250);
        assert_eq!(config.max_backoff_ms, DEFAULT_MAX_BACKOFF_MS);
        assert_eq!(config.retry_policy(), RetryPolicy::MaxAttempts(5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            StreamConfig {
                heartbeat_interval_ms: 0,
                ..Default::default()
            },
            StreamConfig {
                base_backoff_ms: 0,
                ..Default::default()
            },
            StreamConfig {
                base_backoff_ms: 40_000,
                ..Default::default()
            },
            StreamConfig {
                backoff_factor: 0.5,
                ..Default::default()
            },
            StreamConfig {
                backoff_factor: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_retry_policy_allows() {
        assert!(RetryPolicy::Unlimited.allows(u32::MAX));
        let bounded = RetryPolicy::MaxAttempts(2);
        assert!(bounded.allows(0));
        assert!(bounded.allows(1));
        assert!(!bounded.allows(2));
        assert!(!RetryPolicy::MaxAttempts(0).allows(0));
    }
}
