//! Domain error model.

use thiserror::Error;

/// Result type used by the pure domain crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic, client-side failures (input validation, illegal workflow
/// moves, references that do not resolve). Transport failures live in
/// `shipdesk-client`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status change the workflow does not allow.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// An identifier was empty or malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A reference code that does not match any known record.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// A requested record is not present in the local cache.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_reference(reference: impl Into<String>) -> Self {
        Self::UnknownReference(reference.into())
    }

    pub fn transition(from: impl core::fmt::Display, to: impl core::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
