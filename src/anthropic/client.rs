//! Anthropic Messages API client with retry logic.

#![allow(clippy::missing_errors_doc)]

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;

use super::config::{default_config, ANTHROPIC_VERSION, DEFAULT_MAX_TOKENS};
use super::types::{ApiMessage, ApiRequest, ApiResponse};
use crate::error::ClientError;
use crate::traits::{CompletionConfig, CompletionResponse, LlmClientTrait, Message};
use crate::transport::{self, ClientConfig};

/// Maximum number of messages per request.
pub const MAX_MESSAGES: usize = 50;
/// Maximum content length per message (50KB).
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Anthropic API client.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: ClientConfig,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &"[REDACTED]")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ClientError> {
        let client = transport::build_http_client(&config)?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create a client with default configuration.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(api_key, default_config())
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request with retry logic.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        Self::validate_request(&request)?;
        transport::with_retry(&self.config, "anthropic", || self.send_once(&request)).await
    }

    fn validate_request(request: &ApiRequest) -> Result<(), ClientError> {
        if request.messages.is_empty() {
            return Err(ClientError::InvalidRequest {
                message: "At least one message is required".to_string(),
            });
        }
        if request.messages.len() > MAX_MESSAGES {
            return Err(ClientError::InvalidRequest {
                message: format!(
                    "Too many messages: {} > {MAX_MESSAGES}",
                    request.messages.len()
                ),
            });
        }
        if let Some(msg) = request
            .messages
            .iter()
            .find(|m| m.content.len() > MAX_CONTENT_LENGTH)
        {
            return Err(ClientError::InvalidRequest {
                message: format!(
                    "Message too large: {} > {MAX_CONTENT_LENGTH}",
                    msg.content.len()
                ),
            });
        }
        Ok(())
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.config.endpoint("messages");
        let started = Instant::now();

        tracing::debug!(
            url = %url,
            model = %request.model,
            max_tokens = request.max_tokens,
            timeout_ms = self.config.timeout_ms,
            "Starting Anthropic API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| transport::send_error(&e, &self.config, started))?;

        tracing::debug!(
            status = %response.status(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Anthropic API response received"
        );

        let response = transport::check_status(response, &request.model).await?;
        let body: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| ClientError::UnexpectedResponse {
                    message: format!("Failed to parse response: {e}"),
                })?;

        if body.text().trim().is_empty() {
            return Err(ClientError::UnexpectedResponse {
                message: "No content in response".to_string(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl LlmClientTrait for AnthropicClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ClientError> {
        let api_messages: Vec<ApiMessage> = messages.into_iter().map(ApiMessage::from).collect();
        let max_tokens = config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let mut request = ApiRequest::new(&self.config.model, max_tokens, api_messages);
        if let Some(temp) = config.temperature {
            request = request.with_temperature(f64::from(temp));
        }
        // No JSON response mode here; the system prompt asks for JSON instead.
        if let Some(system) = config.system_prompt {
            request = request.with_system(system);
        }

        let response = self.send(request).await?;
        Ok(CompletionResponse::new(response.text(), response.usage.into()))
    }

    fn provider(&self) -> &'static str {
        "anthropic"
    }
}
