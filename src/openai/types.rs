//! OpenAI-compatible chat completions types.

#![allow(clippy::derive_partial_eq_without_eq)]

use serde::{Deserialize, Serialize};

use crate::traits::Usage;

/// Request to `/chat/completions`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System message first, then the conversation.
    pub messages: Vec<ChatTurn>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Generation cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Constrains the reply to a JSON object when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// One message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// "system", "user" or "assistant".
    pub role: String,
    /// Text content.
    pub content: String,
}

impl ChatTurn {
    /// Message with an arbitrary role.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// `response_format` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseFormat {
    /// Always `json_object` here.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    /// JSON object mode.
    #[must_use]
    pub const fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

/// Response from `/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Generated choices; only the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage, when reported.
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Content of the first choice.
    #[must_use]
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// One generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChoiceMessage,
}

/// Message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Text content; null for refusals and tool calls.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage as reported by chat completions.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub struct ChatUsage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens.
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<ChatUsage> for Usage {
    fn from(usage: ChatUsage) -> Self {
        Self::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatTurn::new("user", "hi")],
            temperature: Some(0.3),
            max_tokens: None,
            response_format: Some(ResponseFormat::json_object()),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_first_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"score\":2}"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 6, "total_tokens": 11}
        }))
        .unwrap();
        assert_eq!(response.first_content(), Some("{\"score\":2}"));
        assert_eq!(Usage::from(response.usage.unwrap()).total(), 11);
    }

    #[test]
    fn test_response_without_choices() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(response.first_content(), None);
    }
}
