//! # DomainError
//!
//! Failures reported across the port boundary. Adapters map their own
//! infrastructure errors onto these variants.

use thiserror::Error;

/// The error type returned by every port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Record not found (e.g., Identity, Session, Ban)
    #[error("{0} not found with key {1}")]
    NotFound(String, String),

    /// Malformed input (e.g., unparsable address)
    #[error("validation error: {0}")]
    Validation(String),

    /// Record already exists (e.g., identity created twice)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Collaborator temporarily unreachable (e.g., DB down, player gone)
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Anything else an adapter could not classify
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for port calls.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
