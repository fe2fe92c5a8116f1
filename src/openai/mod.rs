//! OpenAI-compatible chat completions backend.
//!
//! Works against the public OpenAI API or any server exposing the same
//! `/chat/completions` endpoint. JSON output mode maps to
//! `response_format: {"type": "json_object"}`.

mod client;
mod types;

pub use client::{default_config, OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::{ChatRequest, ChatResponse, ChatTurn, ChatUsage, Choice, ChoiceMessage, ResponseFormat};
