//! Failed or garbled interpreter replies leave the session usable.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use deecide::config::{build_interpreter, Provider};
use deecide::decision::{ChatRole, EvaluationMode, Purpose, RequestState, Resolution, Step};
use deecide::driver::{SessionDriver, Update};
use deecide::error::{CollaboratorError, SessionError};
use deecide::interpret::{WeightItem, WeightReply};
use deecide::metrics::InterpreterMetrics;
use deecide::prompts::Capability;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::backends::{config_for, openai_reply};
use super::support::{driver, session_in_evaluation, ScriptedInterpreter};

fn resolutions(updates: Vec<Update>) -> Vec<Resolution> {
    updates
        .into_iter()
        .filter_map(|update| match update {
            Update::Resolved(resolution) => Some(resolution),
            Update::Advanced(_) => None,
        })
        .collect()
}

fn openai_driver(server: &MockServer, metrics: &Arc<InterpreterMetrics>) -> SessionDriver {
    let config = config_for(Provider::OpenAi, server);
    let interpreter = build_interpreter(&config).unwrap();
    let session = session_in_evaluation(EvaluationMode::Conversational, &["Pizza", "Sushi"], &["Taste"])
        .with_timings(config.timings());
    SessionDriver::new(session, interpreter, Arc::clone(metrics))
}

#[tokio::test]
async fn test_server_error_asks_to_rephrase_then_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(openai_reply("{\"score\": 4, \"reasoning\": \"Solid.\"}"))
        .mount(&server)
        .await;

    let metrics = Arc::new(InterpreterMetrics::new());
    let mut driver = openai_driver(&server, &metrics);

    driver.session_mut().send_evaluation_message("pretty good").unwrap();
    let first = resolutions(driver.settle().await);
    assert!(matches!(
        first.as_slice(),
        [Resolution::Retry {
            purpose: Purpose::Evaluation,
            error: CollaboratorError::Transport { .. }
        }]
    ));
    let last = driver.session().evaluation_transcript().last().unwrap().clone();
    assert_eq!(last.role, ChatRole::Assistant);
    assert!(last.content.starts_with("Sorry, I had trouble understanding that."));
    assert_eq!(driver.session().scores().get(0, 0), None);

    driver.session_mut().send_evaluation_message("pretty good").unwrap();
    driver.settle().await;
    assert_eq!(driver.session().scores().get(0, 0), Some(4));
    assert_eq!(driver.session().step(), Step::Evaluation);

    let evaluate = &metrics.summary().by_capability[&Capability::Evaluate];
    assert_eq!(evaluate.calls, 2);
    assert_eq!(evaluate.failed, 1);
    assert_eq!(metrics.events()[0].error_kind.as_deref(), Some("transport"));
}

#[tokio::test]
async fn test_prose_reply_is_an_interpretation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(openai_reply("I think that deserves a solid four."))
        .mount(&server)
        .await;

    let metrics = Arc::new(InterpreterMetrics::new());
    let mut driver = openai_driver(&server, &metrics);

    driver.session_mut().send_evaluation_message("pretty good").unwrap();
    let updates = resolutions(driver.settle().await);

    assert!(matches!(
        updates.as_slice(),
        [Resolution::Retry {
            error: CollaboratorError::Interpretation { .. },
            ..
        }]
    ));
    assert_eq!(driver.session().scores().get(0, 0), None);
    assert!(!driver.session().is_pending(Purpose::Evaluation));
}

#[test]
fn test_second_message_while_waiting_is_rejected() {
    let mut session = session_in_evaluation(EvaluationMode::Conversational, &["Pizza", "Sushi"], &["Taste"]);
    session.send_evaluation_message("great").unwrap();

    let err = session.send_evaluation_message("actually, terrible").unwrap_err();

    assert_eq!(
        err,
        SessionError::RequestPending {
            purpose: Purpose::Evaluation
        }
    );
    assert_eq!(session.evaluation_transcript().len(), 2);
}

#[tokio::test]
async fn test_unusable_weights_ask_to_rephrase() {
    let interpreter = Arc::new(ScriptedInterpreter::default());
    interpreter.push_weights(Ok(WeightReply {
        weights: vec![WeightItem {
            criterion_index: 7,
            weight: Some(5),
            reasoning: String::new(),
        }],
        summary: "Taste matters.".into(),
    }));
    let session = session_in_evaluation(EvaluationMode::Manual, &["Pizza", "Sushi"], &["Taste"]);
    let mut driver = driver(session, Arc::clone(&interpreter));
    driver.session_mut().set_score(0, 0, 4).unwrap();
    driver.session_mut().set_score(1, 0, 2).unwrap();
    assert!(driver.session_mut().advance().moved());

    driver.session_mut().send_weighing_message("taste is everything").unwrap();
    let updates = resolutions(driver.settle().await);

    assert!(matches!(
        updates.as_slice(),
        [Resolution::Retry {
            purpose: Purpose::Weighing,
            ..
        }]
    ));
    assert_eq!(driver.session().weights().get(0), None);
    assert_eq!(driver.session().step(), Step::Weighing);
}

#[tokio::test]
async fn test_explanation_failure_keeps_the_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = Arc::new(InterpreterMetrics::new());
    let mut driver = openai_driver(&server, &metrics);
    {
        let session = driver.session_mut();
        assert!(session.set_mode(EvaluationMode::Manual));
        session.set_score(0, 0, 2).unwrap();
        session.set_score(1, 0, 5).unwrap();
        assert!(session.advance().moved());
        session.set_weight(0, 4).unwrap();
        assert!(session.advance().moved());
    }

    let updates = resolutions(driver.settle().await);

    assert!(matches!(
        updates.as_slice(),
        [Resolution::Failed {
            purpose: Purpose::Explanation,
            ..
        }]
    ));
    assert!(matches!(driver.session().explanation(), RequestState::Failed(_)));
    let result = driver.session().result().unwrap();
    assert_eq!(result.winner_index, Some(1));
    assert_eq!(result.weighted_totals, vec![8, 20]);
}
