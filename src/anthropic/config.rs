//! Anthropic backend defaults.

use crate::transport::ClientConfig;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
/// Default generation cap when the caller sets none.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// `anthropic-version` header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client configuration pointing at the public Anthropic API.
#[must_use]
pub fn default_config() -> ClientConfig {
    ClientConfig::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
}
