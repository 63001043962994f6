//! Error types for the domain layer.

use thiserror::Error;

/// A domain value or transition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl ValidationError {
    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        ValidationError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    pub fn invalid_timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
