//! Collection run configuration
//!
//! Recognized options for one invocation of `collect`. All fields have
//! defaults so callers can pass a partial (or empty) options object.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a single collection run.
///
/// Deserialized from the caller's options object; unspecified fields fall
/// back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectConfig {
    /// Maximum number of execution units in flight at once
    pub max_concurrency: usize,
    /// Wall-clock budget for a single execution unit (ms)
    pub per_unit_timeout_ms: u64,
    /// Total attempts per unit (1 = no retries); retries apply to failed
    /// attempts only, a timed-out attempt is terminal
    pub retry_attempts: u32,
    /// Delay between attempts (ms)
    pub retry_delay_ms: u64,
    /// When true, a probe whose preconditions are unmet contributes an
    /// explicit availability marker; when false it surfaces as a hard failure
    pub skip_unavailable_probes: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            per_unit_timeout_ms: 5000,
            retry_attempts: 1,
            retry_delay_ms: 0,
            skip_unavailable_probes: true,
        }
    }
}

impl CollectConfig {
    /// Validate the configuration before any probe executes.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency < 1 {
            return Err(Error::InvalidConfig(format!(
                "maxConcurrency must be >= 1, got {}",
                self.max_concurrency
            )));
        }
        if self.per_unit_timeout_ms < 1 {
            return Err(Error::InvalidConfig(
                "perUnitTimeoutMs must be >= 1".to_string(),
            ));
        }
        if self.retry_attempts < 1 {
            return Err(Error::InvalidConfig(format!(
                "retryAttempts must be >= 1, got {}",
                self.retry_attempts
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectConfig::default();
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.per_unit_timeout_ms, 5000);
        assert_eq!(config.retry_attempts, 1);
        assert!(config.skip_unavailable_probes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config = CollectConfig {
            max_concurrency: 0,
            ..CollectConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("maxConcurrency"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = CollectConfig {
            per_unit_timeout_ms: 0,
            ..CollectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let config = CollectConfig {
            retry_attempts: 0,
            ..CollectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_options_deserialize() {
        let config: CollectConfig =
            serde_json::from_str(r#"{"maxConcurrency": 3}"#).unwrap();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.per_unit_timeout_ms, 5000);
    }
}
