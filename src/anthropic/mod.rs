//! Anthropic API backend.
//!
//! Implements [`LlmClientTrait`](crate::traits::LlmClientTrait) over the
//! Messages API using `reqwest`, with request size limits and retry with
//! exponential backoff.

mod client;
mod config;
mod types;

pub use client::{AnthropicClient, MAX_CONTENT_LENGTH, MAX_MESSAGES};
pub use config::{
    default_config, ANTHROPIC_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use types::{ApiMessage, ApiRequest, ApiResponse, ApiUsage, ContentBlock};
