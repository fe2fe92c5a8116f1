//! Trait definitions for mockable dependencies.
//!
//! - [`LlmClientTrait`]: chat-completion backend (Anthropic or OpenAI-compatible)
//! - [`Interpreter`]: the four capabilities the decision session relies on
//!
//! Both traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! so unit tests can inject scripted behavior.

mod types;

pub use types::{CompletionConfig, CompletionResponse, Message, Role, Usage};

use async_trait::async_trait;

use crate::error::{ClientError, CollaboratorError};
use crate::interpret::{
    EvaluateReply, EvaluateRequest, ExplainRequest, SuggestRequest, WeightReply, WeightRequest,
};

/// Chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClientTrait: Send + Sync {
    /// Send a completion request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    async fn complete(
        &self,
        messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ClientError>;

    /// Short backend name for logs.
    fn provider(&self) -> &'static str;
}

/// Interpretation collaborator.
///
/// Every reply is advisory: the session clamps and validates what comes
/// back, and a failure only ever asks the user to try again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Propose options or criteria for a decision title.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on invalid input or an unusable reply.
    async fn suggest(&self, request: SuggestRequest) -> Result<Vec<String>, CollaboratorError>;

    /// Turn a free-text evaluation into a score.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on invalid input or an unusable reply.
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateReply, CollaboratorError>;

    /// Turn free text about importance into per-criterion weights.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on invalid input or an unusable reply.
    async fn weigh(&self, request: WeightRequest) -> Result<WeightReply, CollaboratorError>;

    /// Explain why the winner came out on top.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on invalid input or backend failure.
    async fn explain(&self, request: ExplainRequest) -> Result<String, CollaboratorError>;
}

#[async_trait]
impl<T: LlmClientTrait + ?Sized> LlmClientTrait for std::sync::Arc<T> {
    async fn complete(
        &self,
        messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ClientError> {
        (**self).complete(messages, config).await
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }
}
