//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (a `.env` file is honored)
//! - Backend selection ([`Provider`])
//! - Validation of limits and delays
//! - Secure API key storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use deecide::config::{Config, Provider, SecretString};
//!
//! let config = Config::new(Provider::OpenAi, SecretString::new("sk-example-key"));
//! assert_eq!(config.model, "gpt-4o-mini");
//! assert_eq!(config.timings().weighing_advance.as_millis(), 3000);
//!
//! let debug = format!("{config:?}");
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("sk-example-key"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_config, MAX_ADVANCE_DELAY_MS, MAX_RETRIES, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::anthropic::{self, AnthropicClient};
use crate::decision::{SessionTimings, DEFAULT_EVALUATION_ADVANCE, DEFAULT_WEIGHING_ADVANCE};
use crate::error::{ClientError, ConfigError};
use crate::interpret::LlmInterpreter;
use crate::openai::{self, OpenAiClient};
use crate::traits::Interpreter;
use crate::transport::{ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Which completion backend interprets replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    /// Anthropic Messages API.
    #[default]
    Anthropic,
    /// OpenAI-compatible Chat Completions API.
    OpenAi,
}

impl Provider {
    /// Name used in `DEECIDE_PROVIDER`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    /// Variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Variable overriding this provider's model.
    #[must_use]
    pub const fn model_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_MODEL",
            Self::OpenAi => "OPENAI_MODEL",
        }
    }

    const fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::OpenAi => openai::DEFAULT_MODEL,
        }
    }

    const fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_BASE_URL,
            Self::OpenAi => openai::DEFAULT_BASE_URL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            _ => Err(ConfigError::InvalidValue {
                var: "DEECIDE_PROVIDER".into(),
                reason: format!("unknown provider '{s}' (expected anthropic or openai)"),
            }),
        }
    }
}

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
/// The API key is a [`SecretString`] so it never reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend in use.
    pub provider: Provider,
    /// API key for the backend.
    pub api_key: SecretString,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Per-attempt request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause before leaving evaluation once every pair is scored.
    pub evaluation_advance_ms: u64,
    /// Pause before leaving weighing once every criterion is weighted.
    pub weighing_advance_ms: u64,
}

impl Config {
    /// Defaults for `provider` with the given key.
    #[must_use]
    pub fn new(provider: Provider, api_key: SecretString) -> Self {
        Self {
            provider,
            api_key,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            evaluation_advance_ms: millis(DEFAULT_EVALUATION_ADVANCE),
            weighing_advance_ms: millis(DEFAULT_WEIGHING_ADVANCE),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `DEECIDE_PROVIDER`: `anthropic` (default) or `openai`
    /// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`: required for the chosen provider
    /// - `ANTHROPIC_MODEL` / `OPENAI_MODEL`: model override
    /// - `OPENAI_BASE_URL`: OpenAI-compatible endpoint (default `https://api.openai.com/v1`)
    /// - `LOG_LEVEL`: default `info`
    /// - `REQUEST_TIMEOUT_MS`: default `30000`
    /// - `MAX_RETRIES`: default `3`
    /// - `EVALUATION_ADVANCE_DELAY_MS`: default `2000`
    /// - `WEIGHING_ADVANCE_DELAY_MS`: default `3000`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the provider's key is missing, a number does
    /// not parse, or a value fails [`validate_config`].
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let provider = std::env::var("DEECIDE_PROVIDER")
            .map_or(Ok(Provider::default()), |v| v.parse())?;

        let key_var = provider.api_key_var();
        let api_key = std::env::var(key_var).map_err(|_| ConfigError::MissingRequired {
            var: key_var.into(),
        })?;

        let mut config = Self::new(provider, SecretString::new(api_key));
        if let Ok(model) = std::env::var(provider.model_var()) {
            config.model = model;
        }
        if provider == Provider::OpenAi {
            if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
                config.base_url = base_url;
            }
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        config.request_timeout_ms = parse_env_u64("REQUEST_TIMEOUT_MS", config.request_timeout_ms)?;
        config.max_retries = parse_env_u32("MAX_RETRIES", config.max_retries)?;
        config.evaluation_advance_ms =
            parse_env_u64("EVALUATION_ADVANCE_DELAY_MS", config.evaluation_advance_ms)?;
        config.weighing_advance_ms =
            parse_env_u64("WEIGHING_ADVANCE_DELAY_MS", config.weighing_advance_ms)?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Backend client settings.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url, &self.model)
            .with_timeout_ms(self.request_timeout_ms)
            .with_max_retries(self.max_retries)
    }

    /// Auto-advance delays for new sessions.
    #[must_use]
    pub const fn timings(&self) -> SessionTimings {
        SessionTimings {
            evaluation_advance: Duration::from_millis(self.evaluation_advance_ms),
            weighing_advance: Duration::from_millis(self.weighing_advance_ms),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Build the interpreter for the configured backend.
///
/// # Errors
///
/// Returns [`ClientError::Network`] if the HTTP client cannot be created.
pub fn build_interpreter(config: &Config) -> Result<Arc<dyn Interpreter>, ClientError> {
    let client_config = config.client_config();
    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        base_url = %config.base_url,
        "Building interpreter"
    );
    Ok(match config.provider {
        Provider::Anthropic => Arc::new(LlmInterpreter::new(AnthropicClient::new(
            config.api_key.expose(),
            client_config,
        )?)),
        Provider::OpenAi => Arc::new(LlmInterpreter::new(OpenAiClient::new(
            Some(config.api_key.expose().to_string()),
            client_config,
        )?)),
    })
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
