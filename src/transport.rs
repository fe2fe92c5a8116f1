//! HTTP plumbing shared by the LLM backends.
//!
//! - [`ClientConfig`]: endpoint, model, timeout and retry settings
//! - [`with_retry`]: exponential backoff over retryable [`ClientError`]s
//! - [`check_status`]: maps HTTP failures onto [`ClientError`]

#![allow(clippy::missing_errors_doc)]

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::{Client, Response, StatusCode};

use crate::error::ClientError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default retry count after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Initial backoff delay; doubled after each retry.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// Fallback wait when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

/// Backend client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Initial backoff delay.
    pub retry_delay_ms: u64,
}

impl ClientConfig {
    /// Configuration for `base_url` and `model` with default limits.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry count.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial backoff delay.
    #[must_use]
    pub const fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// `base_url` joined with `path`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Build a `reqwest` client honoring the configured timeout.
pub fn build_http_client(config: &ClientConfig) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| ClientError::Network {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. The delay doubles after each retry.
pub async fn with_retry<T, F, Fut>(
    config: &ClientConfig,
    provider: &'static str,
    mut attempt: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut last_error = None;
    let mut delay = config.retry_delay_ms;

    for attempt_no in 0..=config.max_retries {
        if attempt_no > 0 {
            tracing::warn!(provider, attempt = attempt_no, delay_ms = delay, "Retrying request");
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay = delay.saturating_mul(2);
        }

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }
                tracing::warn!(provider, error = %e, attempt = attempt_no, "Retryable error occurred");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ClientError::Network {
        message: "Unknown error after retries".to_string(),
    }))
}

/// Map a `reqwest` send failure.
pub fn send_error(e: &reqwest::Error, config: &ClientConfig, started: Instant) -> ClientError {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if e.is_timeout() {
        tracing::error!(elapsed_ms, timeout_ms = config.timeout_ms, "Request timed out");
        ClientError::Timeout {
            timeout_ms: config.timeout_ms,
        }
    } else {
        tracing::error!(elapsed_ms, error = %e, "Request failed");
        ClientError::Network {
            message: e.to_string(),
        }
    }
}

/// Pass a successful response through; map every other status.
///
/// 401 and 403 are authentication failures, 429 is rate limiting (honoring
/// `retry-after`), 503 and 529 mean the model is overloaded.
pub async fn check_status(response: Response, model: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::AuthenticationFailed),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS);
            Err(ClientError::RateLimited {
                retry_after_seconds: retry_after,
            })
        }
        StatusCode::SERVICE_UNAVAILABLE => Err(ClientError::ModelOverloaded {
            model: model.to_string(),
        }),
        s if s.as_u16() == 529 => Err(ClientError::ModelOverloaded {
            model: model.to_string(),
        }),
        StatusCode::BAD_REQUEST => {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::InvalidRequest { message: body })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedResponse {
                message: format!("Status {status}: {body}"),
            })
        }
    }
}
