//! OpenAI-compatible chat completions client.

#![allow(clippy::missing_errors_doc)]

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{ChatRequest, ChatResponse, ChatTurn, ResponseFormat};
use crate::error::ClientError;
use crate::traits::{CompletionConfig, CompletionResponse, LlmClientTrait, Message, Usage};
use crate::transport::{self, ClientConfig};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client configuration pointing at the public OpenAI API.
#[must_use]
pub fn default_config() -> ClientConfig {
    ClientConfig::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
}

/// Chat completions client for OpenAI and compatible servers.
///
/// The API key is optional so local compatible servers work without one.
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    config: ClientConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(api_key: Option<String>, config: ClientConfig) -> Result<Self, ClientError> {
        let client = transport::build_http_client(&config)?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request with retry logic.
    pub async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ClientError> {
        if request.messages.is_empty() {
            return Err(ClientError::InvalidRequest {
                message: "At least one message is required".to_string(),
            });
        }
        transport::with_retry(&self.config, "openai", || self.send_once(&request)).await
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = self.config.endpoint("chat/completions");
        let started = Instant::now();

        tracing::debug!(
            url = %url,
            model = %request.model,
            json_mode = request.response_format.is_some(),
            timeout_ms = self.config.timeout_ms,
            "Starting chat completions request"
        );

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| transport::send_error(&e, &self.config, started))?;

        tracing::debug!(
            status = %response.status(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Chat completions response received"
        );

        let response = transport::check_status(response, &request.model).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse {
                message: format!("Failed to parse response: {e}"),
            })
    }
}

#[async_trait]
impl LlmClientTrait for OpenAiClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ClientError> {
        let mut turns = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = config.system_prompt {
            turns.push(ChatTurn::new("system", system));
        }
        turns.extend(
            messages
                .into_iter()
                .map(|m| ChatTurn::new(m.role.as_str(), m.content)),
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: turns,
            temperature: config.temperature.map(f64::from),
            max_tokens: config.max_tokens,
            response_format: config.json_output.then(ResponseFormat::json_object),
        };

        let response = self.send(request).await?;
        let content = response
            .first_content()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ClientError::UnexpectedResponse {
                message: "No content in response".to_string(),
            })?
            .to_string();
        let usage = response.usage.map_or_else(Usage::default, Usage::from);
        Ok(CompletionResponse::new(content, usage))
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}
