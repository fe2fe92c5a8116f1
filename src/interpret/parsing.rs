//! Lenient reading of language-model output.
//!
//! Models wrap JSON in prose or code fences, send numbers as strings and
//! rename fields. Everything here accepts what it reasonably can and
//! reports the rest as [`CollaboratorError::Interpretation`].

use serde_json::Value;

use super::contract::{EvaluateReply, WeightItem, WeightReply};
use crate::error::CollaboratorError;

const PREVIEW_CHARS: usize = 100;

/// Reasoning used when the model gives none for a score.
pub const DEFAULT_SCORE_REASONING: &str = "Score assigned based on your evaluation.";
/// Summary used when the model gives none for weights.
pub const DEFAULT_WEIGHT_SUMMARY: &str = "Weights assigned based on your preferences.";

/// Find a JSON document in model output.
///
/// Tries, in order: the whole text, a ```json fence, any ``` fence, then the
/// first balanced `{...}` or `[...]`.
///
/// # Errors
///
/// Returns [`CollaboratorError::Interpretation`] when nothing parses.
pub fn extract_json(text: &str) -> Result<Value, CollaboratorError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let candidates = [
        from_code_block(trimmed, "```json"),
        from_code_block(trimmed, "```"),
        balanced(trimmed, '{', '}'),
        balanced(trimmed, '[', ']'),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
    }

    Err(CollaboratorError::interpretation(format!(
        "no JSON found in reply: {}",
        preview(text)
    )))
}

fn from_code_block<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let start = text.find(fence)? + fence.len();
    let rest = text[start..].trim_start();
    let end = rest.find("```")?;
    let body = rest[..end].trim();
    (!body.is_empty()).then_some(body)
}

fn balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if !in_string && c == open => depth += 1,
            c if !in_string && c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Read an integer from a number (floats are rounded) or a numeric string.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        // Float to int casts saturate.
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn require_object(value: &Value) -> Result<(), CollaboratorError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(CollaboratorError::interpretation("expected a JSON object"))
    }
}

/// A rating field; zero counts as absent, like a missing field.
fn rating_field(value: &Value, key: &str) -> Option<i64> {
    lenient_int(value.get(key)).filter(|&n| n != 0)
}

/// Read an evaluation reply. A missing, unreadable or zero score stays `None`.
///
/// # Errors
///
/// Returns [`CollaboratorError::Interpretation`] when `value` is not an object.
pub fn parse_evaluation(value: &Value) -> Result<EvaluateReply, CollaboratorError> {
    require_object(value)?;
    Ok(EvaluateReply {
        score: rating_field(value, "score"),
        reasoning: text_field(value, "reasoning")
            .unwrap_or_else(|| DEFAULT_SCORE_REASONING.to_string()),
    })
}

/// Read a weights reply. Entries without a readable `criterionIndex` are
/// dropped; range checks are left to the session.
///
/// # Errors
///
/// Returns [`CollaboratorError::Interpretation`] when there is no `weights`
/// array.
pub fn parse_weights(value: &Value) -> Result<WeightReply, CollaboratorError> {
    require_object(value)?;
    let entries = value
        .get("weights")
        .and_then(Value::as_array)
        .ok_or_else(|| CollaboratorError::interpretation("reply has no weights array"))?;

    let weights = entries
        .iter()
        .filter_map(|entry| {
            Some(WeightItem {
                criterion_index: lenient_int(entry.get("criterionIndex"))?,
                weight: rating_field(entry, "weight"),
                reasoning: text_field(entry, "reasoning").unwrap_or_default(),
            })
        })
        .collect();

    Ok(WeightReply {
        weights,
        summary: text_field(value, "summary")
            .unwrap_or_else(|| DEFAULT_WEIGHT_SUMMARY.to_string()),
    })
}

/// Read suggestions from a bare array, from an object's `suggestions`,
/// `options` or `criteria` array, or from its first array-valued field.
/// Non-string and blank entries are dropped. Anything else yields none.
#[must_use]
pub fn parse_suggestions(value: &Value) -> Vec<String> {
    let array = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["suggestions", "options", "criteria"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array)),
        _ => None,
    };
    array
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
