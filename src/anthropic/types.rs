//! Anthropic Messages API request and response types.

#![allow(clippy::derive_partial_eq_without_eq)]

use serde::{Deserialize, Serialize};

use crate::traits::{Message, Role, Usage};

/// Request to the Messages API.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiRequest {
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages.
    pub messages: Vec<ApiMessage>,
}

impl ApiRequest {
    /// Create a request with required fields.
    #[must_use]
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: Vec<ApiMessage>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature: None,
            system: None,
            messages,
        }
    }

    /// Set temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// One message in a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    /// "user" or "assistant".
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl From<Message> for ApiMessage {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

/// Response from the Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Content blocks.
    pub content: Vec<ContentBlock>,
    /// Model used.
    #[serde(default)]
    pub model: String,
    /// Token usage.
    #[serde(default)]
    pub usage: ApiUsage,
    /// Why generation stopped.
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ApiResponse {
    /// Text blocks joined by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content block of a response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text output.
    Text {
        /// The text.
        text: String,
    },
    /// Any block type this client does not use.
    #[serde(other)]
    Other,
}

impl ContentBlock {
    /// Text of a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Other => None,
        }
    }
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
pub struct ApiUsage {
    /// Input tokens consumed.
    pub input_tokens: u32,
    /// Output tokens generated.
    pub output_tokens: u32,
}

impl From<ApiUsage> for Usage {
    fn from(usage: ApiUsage) -> Self {
        Self::new(usage.input_tokens, usage.output_tokens)
    }
}
