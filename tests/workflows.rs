//! Workflow integration tests entry point.
//!
//! - Scenarios: aggregation and conversational flows on small decisions
//! - Session: the wizard end to end through the public API
//! - Backends: interpreter over a mocked HTTP completion API
//! - Error recovery: failures that must leave the session usable

mod integration;
