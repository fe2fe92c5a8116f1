//! Interpreter over a mocked completion API, wired the way the binary wires it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use deecide::config::{build_interpreter, Config, Provider, SecretString};
use deecide::decision::{EvaluationMode, ItemKind, Step};
use deecide::driver::SessionDriver;
use deecide::interpret::{ExplainRequest, SuggestRequest};
use deecide::metrics::InterpreterMetrics;
use deecide::prompts::Capability;
use deecide::traits::Interpreter;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::session_in_evaluation;

pub fn config_for(provider: Provider, server: &MockServer) -> Config {
    let mut config = Config::new(provider, SecretString::new("test-key"));
    config.base_url = server.uri();
    config.max_retries = 0;
    config.request_timeout_ms = 5_000;
    config.evaluation_advance_ms = 0;
    config.weighing_advance_ms = 0;
    config
}

pub fn openai_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8}
    }))
}

fn anthropic_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_1",
        "content": [{"type": "text", "text": text}],
        "model": "claude",
        "usage": {"input_tokens": 12, "output_tokens": 8},
        "stop_reason": "end_turn"
    }))
}

#[tokio::test]
async fn test_openai_conversational_evaluation_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .and(body_string_contains("great crust"))
        .respond_with(openai_reply(
            "```json\n{\"score\": 5, \"reasoning\": \"Great crust.\"}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("a bit bland"))
        .respond_with(openai_reply("{\"score\": \"2\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(Provider::OpenAi, &server);
    let interpreter = build_interpreter(&config).unwrap();
    let metrics = Arc::new(InterpreterMetrics::new());
    let session = session_in_evaluation(EvaluationMode::Conversational, &["Pizza", "Sushi"], &["Taste"])
        .with_timings(config.timings());
    let mut driver = SessionDriver::new(session, interpreter, Arc::clone(&metrics));

    driver.session_mut().send_evaluation_message("great crust").unwrap();
    driver.settle().await;
    driver.session_mut().send_evaluation_message("a bit bland").unwrap();
    driver.settle().await;

    let session = driver.session();
    assert_eq!(session.scores().get(0, 0), Some(5));
    assert_eq!(session.scores().get(1, 0), Some(2));
    assert_eq!(session.step(), Step::Weighing);
    let transcript = session.evaluation_transcript();
    assert!(transcript
        .iter()
        .any(|m| m.content.starts_with("Got it! Scored 5/5. Great crust.")));

    let summary = metrics.summary();
    assert_eq!(summary.by_capability[&Capability::Evaluate].calls, 2);
    assert_eq!(summary.by_capability[&Capability::Evaluate].failed, 0);
}

#[tokio::test]
async fn test_anthropic_suggestions_accept_named_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(body_string_contains("Dinner"))
        .respond_with(anthropic_reply(
            "Here you go:\n{\"criteria\": [\"Price\", \" \", \"Taste\", 7]}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let interpreter = build_interpreter(&config_for(Provider::Anthropic, &server)).unwrap();
    let suggestions = interpreter
        .suggest(SuggestRequest {
            decision_title: "Dinner".into(),
            kind: ItemKind::Criteria,
        })
        .await
        .unwrap();

    assert_eq!(suggestions, vec!["Price".to_string(), "Taste".to_string()]);
}

#[tokio::test]
async fn test_explanation_is_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Winner: Sushi"))
        .respond_with(openai_reply("  Sushi wins on taste.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let interpreter = build_interpreter(&config_for(Provider::OpenAi, &server)).unwrap();
    let text = interpreter
        .explain(ExplainRequest {
            decision_title: "Dinner".into(),
            options: vec!["Pizza".into(), "Sushi".into()],
            criteria: vec!["Taste".into()],
            scores: vec![],
            weights: vec![],
            winner_index: 1,
        })
        .await
        .unwrap();

    assert_eq!(text, "Sushi wins on taste.");
}

#[tokio::test]
async fn test_validation_failure_never_reaches_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(openai_reply("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let interpreter = build_interpreter(&config_for(Provider::OpenAi, &server)).unwrap();
    let err = interpreter
        .suggest(SuggestRequest {
            decision_title: "   ".into(),
            kind: ItemKind::Options,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "validation");
}
