//! [`Interpreter`] backed by a chat-completion model.

use std::time::Instant;

use async_trait::async_trait;

use super::contract::{
    EvaluateReply, EvaluateRequest, ExplainRequest, SuggestRequest, Validate, WeightReply,
    WeightRequest,
};
use super::parsing::{extract_json, parse_evaluation, parse_suggestions, parse_weights};
use crate::error::CollaboratorError;
use crate::prompts::{
    evaluate_user_prompt, explain_user_prompt, suggest_system_prompt, suggest_user_prompt,
    weight_user_prompt, Capability, EVALUATE_SYSTEM, EXPLAIN_SYSTEM, WEIGHT_SYSTEM,
};
use crate::traits::{CompletionConfig, Interpreter, LlmClientTrait, Message};

/// Interpreter that prompts a language model and reads its reply leniently.
///
/// Requests are validated before any model call.
#[derive(Debug)]
pub struct LlmInterpreter<C: LlmClientTrait> {
    client: C,
}

impl<C: LlmClientTrait> LlmInterpreter<C> {
    /// Wrap a completion backend.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    async fn ask(
        &self,
        capability: Capability,
        system: &str,
        user: String,
    ) -> Result<String, CollaboratorError> {
        let mut config = CompletionConfig::new()
            .with_system_prompt(system)
            .with_temperature(capability.temperature())
            .with_max_tokens(capability.max_tokens());
        if capability.wants_json() {
            config = config.with_json_output();
        }

        let started = Instant::now();
        let result = self.client.complete(vec![Message::user(user)], config).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(response) => {
                tracing::debug!(
                    provider = self.client.provider(),
                    %capability,
                    elapsed_ms,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "Model call completed"
                );
                Ok(response.content)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.client.provider(),
                    %capability,
                    elapsed_ms,
                    error = %e,
                    "Model call failed"
                );
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<C: LlmClientTrait> Interpreter for LlmInterpreter<C> {
    async fn suggest(&self, request: SuggestRequest) -> Result<Vec<String>, CollaboratorError> {
        request.validate()?;
        let text = self
            .ask(
                Capability::Suggest,
                suggest_system_prompt(request.kind),
                suggest_user_prompt(&request),
            )
            .await?;
        Ok(parse_suggestions(&extract_json(&text)?))
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateReply, CollaboratorError> {
        request.validate()?;
        let text = self
            .ask(
                Capability::Evaluate,
                EVALUATE_SYSTEM,
                evaluate_user_prompt(&request),
            )
            .await?;
        parse_evaluation(&extract_json(&text)?)
    }

    async fn weigh(&self, request: WeightRequest) -> Result<WeightReply, CollaboratorError> {
        request.validate()?;
        let text = self
            .ask(Capability::Weight, WEIGHT_SYSTEM, weight_user_prompt(&request))
            .await?;
        parse_weights(&extract_json(&text)?)
    }

    async fn explain(&self, request: ExplainRequest) -> Result<String, CollaboratorError> {
        request.validate()?;
        let text = self
            .ask(Capability::Explain, EXPLAIN_SYSTEM, explain_user_prompt(&request))
            .await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CollaboratorError::interpretation("empty explanation"));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::decision::ItemKind;
    use crate::error::ClientError;
    use crate::test_utils::{mock_llm_error, mock_llm_reply};
    use crate::traits::{CompletionResponse, MockLlmClientTrait, Usage};
    use pretty_assertions::assert_eq;

    fn replying(text: &'static str) -> LlmInterpreter<MockLlmClientTrait> {
        LlmInterpreter::new(mock_llm_reply(text))
    }

    fn never_called() -> LlmInterpreter<MockLlmClientTrait> {
        let mut mock = MockLlmClientTrait::new();
        mock.expect_complete().never();
        mock.expect_provider().return_const("mock");
        LlmInterpreter::new(mock)
    }

    fn evaluate_request() -> EvaluateRequest {
        EvaluateRequest {
            user_message: "honestly amazing".into(),
            option: "Pizza".into(),
            criterion: "Taste".into(),
        }
    }

    #[tokio::test]
    async fn test_evaluate_reads_fenced_reply() {
        let interpreter = replying("```json\n{\"score\": 5, \"reasoning\": \"Amazing.\"}\n```");
        let reply = interpreter.evaluate(evaluate_request()).await.unwrap();
        assert_eq!(
            reply,
            EvaluateReply {
                score: Some(5),
                reasoning: "Amazing.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_evaluate_uses_json_mode_and_low_temperature() {
        let mut mock = MockLlmClientTrait::new();
        mock.expect_complete()
            .withf(|messages, config| {
                config.json_output
                    && config.temperature == Some(0.3)
                    && messages.len() == 1
                    && messages[0].content.contains("honestly amazing")
            })
            .times(1)
            .returning(|_, _| Ok(CompletionResponse::new("{\"score\": 4}", Usage::default())));
        mock.expect_provider().return_const("mock");
        let reply = LlmInterpreter::new(mock)
            .evaluate(evaluate_request())
            .await
            .unwrap();
        assert_eq!(reply.score, Some(4));
    }

    #[tokio::test]
    async fn test_blank_message_rejected_before_model_call() {
        let interpreter = never_called();
        let mut request = evaluate_request();
        request.user_message = "   ".into();
        let err = interpreter.evaluate(request).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Validation { field, .. } if field == "userMessage"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_interpretation_error() {
        let interpreter = replying("I think it is fine.");
        let err = interpreter.evaluate(evaluate_request()).await.unwrap_err();
        assert_eq!(err.kind(), "interpretation");
    }

    #[tokio::test]
    async fn test_backend_failure_is_transport_error() {
        let interpreter =
            LlmInterpreter::new(mock_llm_error(ClientError::Timeout { timeout_ms: 100 }));
        let err = interpreter.evaluate(evaluate_request()).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_suggest_accepts_named_array() {
        let interpreter = replying("{\"criteria\": [\"Price\", \"Taste\"]}");
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
    async fn test_weigh_keeps_raw_indices() {
        let interpreter = replying(
            "{\"weights\": [{\"criterionIndex\": 0, \"weight\": 5}, {\"criterionIndex\": 9, \"weight\": 1}], \"summary\": \"Taste wins\"}",
        );
        let reply = interpreter
            .weigh(WeightRequest {
                user_message: "taste above all".into(),
                criteria: vec!["Taste".into(), "Price".into()],
            })
            .await
            .unwrap();
        assert_eq!(reply.weights.len(), 2);
        assert_eq!(reply.weights[1].criterion_index, 9);
        assert_eq!(reply.summary, "Taste wins");
    }

    #[tokio::test]
    async fn test_explain_trims_and_rejects_empty() {
        let request = ExplainRequest {
            decision_title: "Dinner".into(),
            options: vec!["Pizza".into(), "Sushi".into()],
            criteria: vec!["Taste".into()],
            scores: vec![],
            weights: vec![],
            winner_index: 0,
        };
        let text = replying("  Pizza wins.  ")
            .explain(request.clone())
            .await
            .unwrap();
        assert_eq!(text, "Pizza wins.");

        let err = replying("   ").explain(request).await.unwrap_err();
        assert_eq!(err.kind(), "interpretation");
    }

    #[tokio::test]
    async fn test_explain_rejects_bad_winner_without_call() {
        let err = never_called()
            .explain(ExplainRequest {
                decision_title: "Dinner".into(),
                options: vec!["Pizza".into()],
                criteria: vec!["Taste".into()],
                scores: vec![],
                weights: vec![],
                winner_index: 3,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
