//! Error types for the decision wizard.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`ClientError`]: Language-model backend errors (Anthropic, `OpenAI`)
//! - [`CollaboratorError`]: Interpretation collaborator failures
//! - [`SessionError`]: Rejected decision session operations
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.
//!
//! Step-transition guard failures are deliberately absent: a blocked
//! transition is reported as [`crate::decision::Transition::Blocked`].

use thiserror::Error;

use crate::decision::{ItemKind, Purpose, Step};

/// Top-level application error.
///
/// This is the main error type returned by the binary entry points.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend client error.
    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    /// Interpretation collaborator error.
    #[error("Interpreter error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Decision session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Console I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Language-model backend errors.
///
/// These errors represent failures when communicating with a completion API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Authentication failed due to invalid API key.
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Request was rate limited.
    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// The requested model is overloaded.
    #[error("Model overloaded: {model}")]
    ModelOverloaded {
        /// The model that is overloaded.
        model: String,
    },

    /// Request timed out.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what's invalid.
        message: String,
    },

    /// Network communication error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// Unexpected response from the API.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl ClientError {
    /// Returns true if this error is retryable.
    ///
    /// Rate limiting, overload, timeouts and network errors are retryable.
    /// Authentication and invalid request errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ModelOverloaded { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}

/// Interpretation collaborator errors.
///
/// Every variant is recoverable: the session re-prompts the user and no
/// ledger is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// A required request field was missing or malformed.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// The offending field, using its wire name.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },

    /// The collaborator answered, but the content could not be interpreted.
    #[error("Could not interpret response: {message}")]
    Interpretation {
        /// Description of the parsing failure.
        message: String,
    },

    /// The collaborator could not be reached.
    #[error("Interpreter unavailable: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

impl CollaboratorError {
    /// Shorthand for a validation failure on `field`.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an interpretation failure.
    #[must_use]
    pub fn interpretation(message: impl Into<String>) -> Self {
        Self::Interpretation {
            message: message.into(),
        }
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Interpretation { .. } => "interpretation",
            Self::Transport { .. } => "transport",
        }
    }
}

impl From<ClientError> for CollaboratorError {
    fn from(err: ClientError) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Decision session errors.
///
/// Returned when an operation is not valid in the current state. The session
/// is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation belongs to another step.
    #[error("Cannot {action} during the {step} step")]
    WrongStep {
        /// The attempted operation.
        action: &'static str,
        /// The step the session is in.
        step: Step,
    },

    /// Text input was empty after trimming.
    #[error("{field} must not be blank")]
    BlankText {
        /// What the text was for.
        field: &'static str,
    },

    /// A positional index does not refer to an existing entry.
    #[error("{kind} index {index} is out of range (have {len})")]
    IndexOutOfRange {
        /// Which list the index refers to.
        kind: ItemKind,
        /// The rejected index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// A request for the same purpose is still outstanding.
    #[error("The {purpose} request is still pending")]
    RequestPending {
        /// The busy purpose.
        purpose: Purpose,
    },

    /// The operation needs conversational evaluation mode.
    #[error("Switch to conversational mode to describe scores in your own words")]
    NotConversational,

    /// The conversational walk has passed the last pair.
    #[error("Every option has been discussed on every criterion")]
    NothingToEvaluate,
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    // Type assertions - verify all errors implement required traits
    assert_impl_all!(AppError: Send, Sync, std::error::Error);
    assert_impl_all!(ClientError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(CollaboratorError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(SessionError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(ConfigError: Send, Sync, std::error::Error, Clone);

    #[test]
    fn test_app_error_display_client() {
        let err = AppError::Client(ClientError::AuthenticationFailed);
        assert_eq!(
            err.to_string(),
            "Backend error: Authentication failed: invalid API key"
        );
    }

    #[test]
    fn test_app_error_display_config() {
        let err = AppError::Config(ConfigError::MissingRequired {
            var: "API_KEY".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required: API_KEY"
        );
    }

    #[test]
    fn test_app_error_from_session_error() {
        let app_err: AppError = SessionError::NothingToEvaluate.into();
        assert!(matches!(app_err, AppError::Session(_)));
    }

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::RateLimited {
            retry_after_seconds: 1
        }
        .is_retryable());
        assert!(ClientError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(ClientError::Network {
            message: "reset".into()
        }
        .is_retryable());
        assert!(ClientError::ModelOverloaded {
            model: "m".into()
        }
        .is_retryable());
        assert!(!ClientError::AuthenticationFailed.is_retryable());
        assert!(!ClientError::InvalidRequest {
            message: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_client_error_maps_to_transport() {
        let err: CollaboratorError = ClientError::Timeout { timeout_ms: 500 }.into();
        assert_eq!(
            err,
            CollaboratorError::Transport {
                message: "Request timeout after 500ms".to_string()
            }
        );
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_collaborator_error_display() {
        let err = CollaboratorError::validation("userMessage", "must not be blank");
        assert_eq!(err.to_string(), "Invalid userMessage: must not be blank");
        assert_eq!(err.kind(), "validation");

        let err = CollaboratorError::interpretation("no JSON");
        assert_eq!(err.to_string(), "Could not interpret response: no JSON");
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::WrongStep {
            action: "add an option",
            step: Step::Input,
        };
        assert_eq!(err.to_string(), "Cannot add an option during the input step");

        let err = SessionError::IndexOutOfRange {
            kind: ItemKind::Criteria,
            index: 4,
            len: 2,
        };
        assert_eq!(err.to_string(), "criterion index 4 is out of range (have 2)");

        let err = SessionError::RequestPending {
            purpose: Purpose::Evaluation,
        };
        assert_eq!(err.to_string(), "The evaluation request is still pending");
    }
}
