//! Configuration validation.
//!
//! Ensures configured values are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed timeout in milliseconds (1 second).
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Longest allowed auto-advance pause (1 minute).
pub const MAX_ADVANCE_DELAY_MS: u64 = 60_000;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - the provider's API key must not be empty
/// - the base URL must be http(s)
/// - `REQUEST_TIMEOUT_MS` must be between 1000 and 300000
/// - `MAX_RETRIES` must be between 0 and 10
/// - both advance delays must be at most 60000
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api_key.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: config.provider.api_key_var().into(),
            reason: "must not be empty".into(),
        });
    }

    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            var: "OPENAI_BASE_URL".into(),
            reason: format!("'{}' is not an http(s) URL", config.base_url),
        });
    }

    if config.request_timeout_ms < MIN_TIMEOUT_MS || config.request_timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::InvalidValue {
            var: "REQUEST_TIMEOUT_MS".into(),
            reason: format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        });
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::InvalidValue {
            var: "MAX_RETRIES".into(),
            reason: format!("must be between 0 and {MAX_RETRIES}"),
        });
    }

    for (var, value) in [
        ("EVALUATION_ADVANCE_DELAY_MS", config.evaluation_advance_ms),
        ("WEIGHING_ADVANCE_DELAY_MS", config.weighing_advance_ms),
    ] {
        if value > MAX_ADVANCE_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                var: var.into(),
                reason: format!("must be at most {MAX_ADVANCE_DELAY_MS} ms"),
            });
        }
    }

    Ok(())
}
