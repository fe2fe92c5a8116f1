//! Decision wizard
//!
//! Walks a decision from a title, through options and criteria, to a
//! weighted score matrix and a ranked result. Scores and weights can be
//! typed directly or described in plain language, in which case a language
//! model interprets the text into numbers.
//!
//! # Features
//!
//! - Six-step wizard with guarded transitions
//! - Weighted-sum aggregation with a stable, lowest-index tie-break
//! - Conversational scoring and weighting through an [`traits::Interpreter`]
//! - Anthropic and OpenAI-compatible backends
//! - Stale replies discarded after the user moves on
//!
//! # Quick Start
//!
//! ```bash
//! ANTHROPIC_API_KEY=sk-ant-xxx ./deecide
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────┐  lines   ┌─────────┐  effects  ┌───────────────┐
//! │ console │─────────▶│ session │──────────▶│    driver     │──────▶ LLM API
//! │ (stdin) │◀─────────│ (sync)  │◀──────────│ (tokio tasks) │
//! └─────────┘  render  └─────────┘ completions└───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod anthropic;
pub mod config;
pub mod console;
pub mod decision;
pub mod driver;
pub mod error;
pub mod interpret;
pub mod metrics;
pub mod openai;
pub mod prompts;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod test_utils;
