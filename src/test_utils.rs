//! Shared test fixtures.
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::decision::{DecisionSession, EvaluationMode};
use crate::error::ClientError;
use crate::traits::{CompletionResponse, MockLlmClientTrait, Usage};

/// A backend that answers every completion with `text`.
#[must_use]
pub fn mock_llm_reply(text: impl Into<String>) -> MockLlmClientTrait {
    let text = text.into();
    let mut mock = MockLlmClientTrait::new();
    mock.expect_complete()
        .returning(move |_, _| Ok(CompletionResponse::new(text.clone(), Usage::new(10, 20))));
    mock.expect_provider().return_const("mock");
    mock
}

/// A backend whose every completion fails with `error`.
#[must_use]
pub fn mock_llm_error(error: ClientError) -> MockLlmClientTrait {
    let mut mock = MockLlmClientTrait::new();
    mock.expect_complete()
        .returning(move |_, _| Err(error.clone()));
    mock.expect_provider().return_const("mock");
    mock
}

/// "Dinner" with options Pizza and Sushi and the criterion Taste, sitting in
/// the evaluation step with no effects queued.
#[must_use]
pub fn dinner_in_evaluation(mode: EvaluationMode) -> DecisionSession {
    let mut session = DecisionSession::new().with_mode(mode);
    session.set_title("Dinner").unwrap();
    session.advance();
    session.add_option("Pizza").unwrap();
    session.add_option("Sushi").unwrap();
    session.advance();
    session.add_criterion("Taste").unwrap();
    session.advance();
    session.drain_effects();
    session
}
