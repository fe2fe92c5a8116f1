//! Conversational transcripts and the assistant lines shown in them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::rating::Rating;

/// Who wrote a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person deciding.
    User,
    /// The session.
    Assistant,
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Text.
    pub content: String,
}

impl ChatMessage {
    /// A line from the user.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// A line from the assistant.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

pub(crate) const EVALUATION_RETRY: &str =
    "Sorry, I had trouble understanding that. Could you rephrase your evaluation?";

pub(crate) const WEIGHING_RETRY: &str =
    "Sorry, I had trouble understanding that. Could you tell me again which criteria matter most to you?";

pub(crate) fn evaluation_prompt(option: &str, criterion: &str) -> String {
    format!(
        "Let's evaluate \"{option}\" based on \"{criterion}\".\n\n\
         How would you rate this? Describe it in your own words."
    )
}

pub(crate) fn evaluation_ack(score: Rating, reasoning: &str, next: Option<(&str, &str)>) -> String {
    match next {
        Some((option, criterion)) => format!(
            "Got it! Scored {score}/5. {reasoning}\n\nNext: {}",
            evaluation_prompt(option, criterion)
        ),
        None => format!(
            "Perfect! Scored {score}/5. {reasoning}\n\n\
             All evaluations complete! Moving on to weighing."
        ),
    }
}

pub(crate) fn weighing_prompt(criteria: &[String]) -> String {
    let mut text = String::from(
        "Now let's decide how much each criterion matters. Here are your criteria:\n\n",
    );
    for (i, criterion) in criteria.iter().enumerate() {
        let _ = writeln!(text, "{}. {criterion}", i + 1);
    }
    text.push_str(
        "\nTell me which ones matter most. For example: \"Price and convenience are \
         very important, but design is less critical\" or \"They're all equally important.\"",
    );
    text
}

/// One applied weight, for the acknowledgement.
pub(crate) struct AppliedWeight<'a> {
    pub criterion: &'a str,
    pub weight: Rating,
    pub reasoning: &'a str,
}

pub(crate) fn weighing_ack(applied: &[AppliedWeight<'_>], summary: &str, missing: &[&str]) -> String {
    let mut text = String::from("Perfect! Here's how I've weighted your criteria:\n\n");
    for item in applied {
        let _ = writeln!(
            text,
            "\u{2022} {}: {}/5 - {}",
            item.criterion, item.weight, item.reasoning
        );
    }
    if !summary.is_empty() {
        let _ = write!(text, "\n{summary}");
    }
    if missing.is_empty() {
        text.push_str("\n\nReady to see your results!");
    } else {
        let _ = write!(
            text,
            "\n\nStill missing: {}. Tell me about those too, or set them directly.",
            missing.join(", ")
        );
    }
    text
}
