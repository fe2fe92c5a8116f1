//! Prompt templates for the four interpretation capabilities.
//!
//! Each capability has a fixed system prompt and a user prompt built from
//! the request. [`Capability`] carries the sampling settings used with them.
//!
//! # Example
//!
//! ```
//! use deecide::interpret::EvaluateRequest;
//! use deecide::prompts::evaluate_user_prompt;
//!
//! let prompt = evaluate_user_prompt(&EvaluateRequest {
//!     user_message: "pretty decent".into(),
//!     option: "Pizza".into(),
//!     criterion: "Taste".into(),
//! });
//! assert!(prompt.contains("Option: \"Pizza\""));
//! ```

use std::fmt::{self, Write as _};

use crate::decision::ItemKind;
use crate::interpret::{EvaluateRequest, ExplainRequest, SuggestRequest, WeightRequest};

/// The four interpreter capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Propose options or criteria.
    Suggest,
    /// Free text to score.
    Evaluate,
    /// Free text to weights.
    Weight,
    /// Narrative explanation of the result.
    Explain,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Self; 4] = [Self::Suggest, Self::Evaluate, Self::Weight, Self::Explain];

    /// Sampling temperature. Interpreting replies stays conservative;
    /// generating text gets more room.
    #[must_use]
    pub const fn temperature(self) -> f32 {
        match self {
            Self::Evaluate | Self::Weight => 0.3,
            Self::Suggest | Self::Explain => 0.7,
        }
    }

    /// Generation cap.
    #[must_use]
    pub const fn max_tokens(self) -> u32 {
        match self {
            Self::Suggest | Self::Evaluate => 400,
            Self::Weight => 800,
            Self::Explain => 1200,
        }
    }

    /// Whether the reply must be a JSON document.
    #[must_use]
    pub const fn wants_json(self) -> bool {
        !matches!(self, Self::Explain)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suggest => "suggest",
            Self::Evaluate => "evaluate",
            Self::Weight => "weight",
            Self::Explain => "explain",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System prompt for suggestions of `kind`.
#[must_use]
pub const fn suggest_system_prompt(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Options => SUGGEST_OPTIONS_SYSTEM,
        ItemKind::Criteria => SUGGEST_CRITERIA_SYSTEM,
    }
}

const SUGGEST_OPTIONS_SYSTEM: &str = r#"You are a helpful decision-making assistant. Given a decision the user needs to make, suggest 3-5 relevant and practical options they should consider. Be specific to their situation.

Respond with valid JSON only:
{ "suggestions": ["option 1", "option 2", "option 3"] }"#;

const SUGGEST_CRITERIA_SYSTEM: &str = r#"You are a helpful decision-making assistant. Given a decision the user needs to make, suggest 3-5 important criteria they should evaluate their options against. Be specific and relevant.

Respond with valid JSON only:
{ "suggestions": ["criterion 1", "criterion 2", "criterion 3"] }"#;

/// User prompt for a suggestion request.
#[must_use]
pub fn suggest_user_prompt(request: &SuggestRequest) -> String {
    let what = match request.kind {
        ItemKind::Options => "specific options to consider",
        ItemKind::Criteria => "evaluation criteria",
    };
    format!(
        "Decision: \"{}\"\n\nProvide 3-5 {what}.",
        request.decision_title.trim()
    )
}

/// System prompt for interpreting an evaluation.
pub const EVALUATE_SYSTEM: &str = r#"You are a decision-making assistant that interprets natural language evaluations and converts them into numeric scores from 1-5.

Score meanings:
1 = Very poor/unsatisfactory
2 = Below average
3 = Average/acceptable
4 = Good/above average
5 = Excellent/outstanding

Analyze the user's response and pick the score that best matches it. Give a brief reasoning (1-2 sentences).

Respond with valid JSON only:
{ "score": <integer 1-5>, "reasoning": "brief explanation" }"#;

/// User prompt for an evaluation request.
#[must_use]
pub fn evaluate_user_prompt(request: &EvaluateRequest) -> String {
    format!(
        "Option: \"{}\"\nCriterion: \"{}\"\nUser's evaluation: \"{}\"\n\n\
         Based on the user's evaluation, what score (1-5) best represents their assessment?",
        request.option.trim(),
        request.criterion.trim(),
        request.user_message.trim()
    )
}

/// System prompt for interpreting importance weights.
pub const WEIGHT_SYSTEM: &str = r#"You are a decision-making assistant that interprets natural language to assign importance weights to criteria.

The user describes which criteria matter more or less to them. Assign a weight from 1-5 to each criterion:
1 = Not important
2 = Slightly important
3 = Moderately important
4 = Very important
5 = Extremely important

Refer to criteria by the index shown next to them.

Respond with valid JSON only:
{
  "weights": [
    { "criterionIndex": 0, "weight": <integer 1-5>, "reasoning": "brief explanation" }
  ],
  "summary": "brief overall explanation of the weighting"
}"#;

/// User prompt for a weighting request. Criteria are listed zero-based so
/// the indices in the reply line up with the request.
#[must_use]
pub fn weight_user_prompt(request: &WeightRequest) -> String {
    let mut text = String::from("Criteria:\n");
    for (i, criterion) in request.criteria.iter().enumerate() {
        let _ = writeln!(text, "{i}. {criterion}");
    }
    let _ = write!(
        text,
        "\nUser's preference: \"{}\"\n\n\
         Based on what the user said, assign appropriate weights (1-5) to each criterion.",
        request.user_message.trim()
    );
    text
}

/// System prompt for explaining a result.
pub const EXPLAIN_SYSTEM: &str = r"You are a thoughtful decision-making advisor. Given the results of a decision matrix, explain clearly:
1. Why the winner is the best choice based on the data
2. Key strengths and weaknesses of the winning option
3. Important considerations or potential concerns
4. A brief mention of the runner-up, if relevant

Keep it concise (2-3 paragraphs), balanced and actionable. Reply in plain text.";

/// User prompt for an explanation request: a plain-text summary of the
/// matrix. Missing weights show as 1 and missing scores as 0, matching how
/// the totals were computed.
#[must_use]
pub fn explain_user_prompt(request: &ExplainRequest) -> String {
    let winner = request
        .options
        .get(request.winner_index)
        .map_or("(unknown)", String::as_str);

    let mut text = format!(
        "Decision: {}\n\nWinner: {winner}\n\nOptions evaluated:\n",
        request.decision_title.trim()
    );
    for (i, option) in request.options.iter().enumerate() {
        let _ = writeln!(text, "{}. {option}", i + 1);
    }
    text.push_str("\nCriteria used:\n");
    for (i, criterion) in request.criteria.iter().enumerate() {
        let weight = request.weight_of(i).unwrap_or(1);
        let _ = writeln!(text, "{}. {criterion} (weight: {weight})", i + 1);
    }
    text.push_str("\nScores:\n");
    for (o, option) in request.options.iter().enumerate() {
        let _ = writeln!(text, "\n{option}:");
        for (c, criterion) in request.criteria.iter().enumerate() {
            let score = request.score_of(o, c).unwrap_or(0);
            let _ = writeln!(text, "  - {criterion}: {score}/5");
        }
    }
    text
}
