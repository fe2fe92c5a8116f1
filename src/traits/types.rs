//! Shared types for the traits module.
//!
//! - [`Message`]: one chat turn sent to a language model
//! - [`CompletionConfig`]: per-request sampling options
//! - [`CompletionResponse`]: model text plus token usage
//! - [`Usage`]: token counts

use serde::{Deserialize, Serialize};

/// Author of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Caller-supplied content.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Text.
    pub content: String,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Completion configuration.
#[derive(Debug, Clone, Default, PartialEq)]
// f32 temperature rules out Eq.
#[allow(clippy::derive_partial_eq_without_eq)]
pub struct CompletionConfig {
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// System prompt.
    pub system_prompt: Option<String>,
    /// Ask the backend for a JSON object reply where it supports that.
    pub json_output: bool,
}

impl CompletionConfig {
    /// Create a new completion config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Request a JSON object reply.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Token usage of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Completion tokens.
    pub output_tokens: u32,
}

impl Usage {
    /// Create new usage info.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Concatenated text output.
    pub content: String,
    /// Token usage.
    pub usage: Usage,
}

impl CompletionResponse {
    /// Create a new completion response.
    #[must_use]
    pub fn new(content: impl Into<String>, usage: Usage) -> Self {
        Self {
            content: content.into(),
            usage,
        }
    }
}
