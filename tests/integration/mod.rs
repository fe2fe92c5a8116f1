//! Integration tests for the decision wizard.

mod backends;
mod error_recovery;
mod scenarios;
mod session_workflow;
mod support;
