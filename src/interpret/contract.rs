//! Wire contract of the four interpreter capabilities.
//!
//! Field names are camelCase on the wire. Every request field is required;
//! [`decode_request`] rejects a payload with a missing field as a
//! [`CollaboratorError::Validation`] before any interpretation happens.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::decision::{ItemKind, ScoreEntry, WeightEntry};
use crate::error::CollaboratorError;

/// Boundary checks shared by every request type.
pub trait Validate {
    /// Reject blank or inconsistent fields.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Validation`] naming the offending field.
    fn validate(&self) -> Result<(), CollaboratorError>;
}

fn require_text(field: &str, value: &str) -> Result<(), CollaboratorError> {
    if value.trim().is_empty() {
        return Err(CollaboratorError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// Turn a raw JSON payload into a validated request.
///
/// # Errors
///
/// Returns [`CollaboratorError::Validation`] when a field is missing, has the
/// wrong type, or fails [`Validate::validate`].
pub fn decode_request<T>(payload: serde_json::Value) -> Result<T, CollaboratorError>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_value(payload).map_err(|e| {
        let message = e.to_string();
        let field = missing_field_name(&message).unwrap_or("request");
        CollaboratorError::validation(field, message.clone())
    })?;
    request.validate()?;
    Ok(request)
}

/// Extract `x` from serde's "missing field `x`" message.
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

// ============================================================================
// Evaluate
// ============================================================================

/// Interpret a free-text evaluation of one option on one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// What the user said.
    pub user_message: String,
    /// Option text.
    pub option: String,
    /// Criterion text.
    pub criterion: String,
}

impl Validate for EvaluateRequest {
    fn validate(&self) -> Result<(), CollaboratorError> {
        require_text("userMessage", &self.user_message)?;
        require_text("option", &self.option)?;
        require_text("criterion", &self.criterion)
    }
}

/// Interpreted score. `score` is raw: the session defaults and clamps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateReply {
    /// Proposed score, not yet clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Short justification.
    #[serde(default)]
    pub reasoning: String,
}

// ============================================================================
// Weight
// ============================================================================

/// Interpret free text about how much each criterion matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRequest {
    /// What the user said.
    pub user_message: String,
    /// Every criterion, in order.
    pub criteria: Vec<String>,
}

impl Validate for WeightRequest {
    fn validate(&self) -> Result<(), CollaboratorError> {
        require_text("userMessage", &self.user_message)?;
        if self.criteria.is_empty() {
            return Err(CollaboratorError::validation("criteria", "must not be empty"));
        }
        Ok(())
    }
}

/// One proposed weight. Index and value are raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightItem {
    /// Position in the request's criteria; may be out of range.
    pub criterion_index: i64,
    /// Proposed weight, not yet clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    /// Short justification.
    #[serde(default)]
    pub reasoning: String,
}

/// Interpreted weights plus an overall summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightReply {
    /// Proposed weights.
    pub weights: Vec<WeightItem>,
    /// Overall explanation.
    #[serde(default)]
    pub summary: String,
}

// ============================================================================
// Suggest
// ============================================================================

/// Ask for options or criteria worth considering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    /// What is being decided.
    pub decision_title: String,
    /// Which list to suggest for.
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl Validate for SuggestRequest {
    fn validate(&self) -> Result<(), CollaboratorError> {
        require_text("decisionTitle", &self.decision_title)
    }
}

/// Suggested entries; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestReply {
    /// Suggestions in the interpreter's order.
    pub suggestions: Vec<String>,
}

// ============================================================================
// Explain
// ============================================================================

/// Ask for a narrative explanation of the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    /// What is being decided.
    pub decision_title: String,
    /// Option texts.
    pub options: Vec<String>,
    /// Criterion texts.
    pub criteria: Vec<String>,
    /// Every recorded score.
    pub scores: Vec<ScoreEntry>,
    /// Every recorded weight.
    pub weights: Vec<WeightEntry>,
    /// Winning option.
    pub winner_index: usize,
}

impl Validate for ExplainRequest {
    fn validate(&self) -> Result<(), CollaboratorError> {
        require_text("decisionTitle", &self.decision_title)?;
        if self.options.is_empty() {
            return Err(CollaboratorError::validation("options", "must not be empty"));
        }
        if self.criteria.is_empty() {
            return Err(CollaboratorError::validation("criteria", "must not be empty"));
        }
        if self.winner_index >= self.options.len() {
            return Err(CollaboratorError::validation(
                "winnerIndex",
                format!("{} is not an option index", self.winner_index),
            ));
        }
        Ok(())
    }
}

impl ExplainRequest {
    /// Weight recorded for a criterion, if any.
    #[must_use]
    pub fn weight_of(&self, criterion_index: usize) -> Option<u8> {
        self.weights
            .iter()
            .find(|w| w.criterion_index == criterion_index)
            .map(|w| w.weight.value())
    }

    /// Score recorded for a pair, if any.
    #[must_use]
    pub fn score_of(&self, option_index: usize, criterion_index: usize) -> Option<u8> {
        self.scores
            .iter()
            .find(|s| s.option_index == option_index && s.criterion_index == criterion_index)
            .map(|s| s.score.value())
    }
}

/// Narrative explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainReply {
    /// Advisory text.
    pub explanation: String,
}
