//! Interpretation collaborator.
//!
//! - [`contract`]: camelCase request/reply types and boundary validation
//! - [`parsing`]: lenient JSON extraction from model output
//! - [`LlmInterpreter`]: the [`Interpreter`](crate::traits::Interpreter)
//!   implementation over any [`LlmClientTrait`](crate::traits::LlmClientTrait)

pub mod contract;
mod llm;
pub mod parsing;

pub use contract::{
    decode_request, EvaluateReply, EvaluateRequest, ExplainReply, ExplainRequest, SuggestReply,
    SuggestRequest, Validate, WeightItem, WeightReply, WeightRequest,
};
pub use llm::LlmInterpreter;
pub use parsing::extract_json;
