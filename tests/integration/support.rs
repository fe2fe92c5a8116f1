//! Scripted interpreter and session builders shared by the workflow tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deecide::decision::{DecisionSession, EvaluationMode};
use deecide::driver::SessionDriver;
use deecide::error::CollaboratorError;
use deecide::interpret::{
    EvaluateReply, EvaluateRequest, ExplainRequest, SuggestRequest, WeightReply, WeightRequest,
};
use deecide::metrics::InterpreterMetrics;
use deecide::traits::Interpreter;

/// Interpreter that replays queued replies and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    pub evaluations: Mutex<VecDeque<Result<EvaluateReply, CollaboratorError>>>,
    pub weights: Mutex<VecDeque<Result<WeightReply, CollaboratorError>>>,
    pub evaluate_requests: Mutex<Vec<EvaluateRequest>>,
    pub explain_requests: Mutex<Vec<ExplainRequest>>,
}

impl ScriptedInterpreter {
    pub fn with_scores(scores: &[i64]) -> Self {
        let interpreter = Self::default();
        {
            let mut queue = interpreter.evaluations.lock().unwrap();
            for &score in scores {
                queue.push_back(Ok(EvaluateReply {
                    score: Some(score),
                    reasoning: format!("Sounds like a {score}."),
                }));
            }
        }
        interpreter
    }

    pub fn push_weights(&self, reply: Result<WeightReply, CollaboratorError>) {
        self.weights.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn suggest(&self, request: SuggestRequest) -> Result<Vec<String>, CollaboratorError> {
        Ok(vec![format!("Suggested {}", request.kind.singular())])
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateReply, CollaboratorError> {
        self.evaluate_requests.lock().unwrap().push(request);
        self.evaluations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::interpretation("script exhausted")))
    }

    async fn weigh(&self, _request: WeightRequest) -> Result<WeightReply, CollaboratorError> {
        self.weights
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::interpretation("script exhausted")))
    }

    async fn explain(&self, request: ExplainRequest) -> Result<String, CollaboratorError> {
        let winner = request.options[request.winner_index].clone();
        self.explain_requests.lock().unwrap().push(request);
        Ok(format!("{winner} comes out ahead."))
    }
}

/// Session in evaluation with the given lists.
pub fn session_in_evaluation(
    mode: EvaluationMode,
    options: &[&str],
    criteria: &[&str],
) -> DecisionSession {
    let mut session = DecisionSession::new().with_mode(mode);
    session.set_title("Dinner").unwrap();
    assert!(session.advance().moved());
    for option in options {
        session.add_option(option).unwrap();
    }
    assert!(session.advance().moved());
    for criterion in criteria {
        session.add_criterion(criterion).unwrap();
    }
    assert!(session.advance().moved());
    session.drain_effects();
    session
}

pub fn driver(session: DecisionSession, interpreter: Arc<ScriptedInterpreter>) -> SessionDriver {
    SessionDriver::new(session, interpreter, Arc::new(InterpreterMetrics::new()))
}
