//! Errors raised by the domain rules.

use thiserror::Error;

/// A rule of the cart refused an operation.
///
/// Only deterministic outcomes of the domain rules live here. Storage,
/// hashing and transport failures are wrapped by the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Operator input the rules refuse: missing patient reference, a
    /// quantity above stock, an incomplete checklist.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A label or id that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The record's current state forbids the operation, e.g. replacing a
    /// resolved log or starting a checklist with open logs.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
