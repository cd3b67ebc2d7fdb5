//! # IssueError
//!
//! Why a ban operation, or one candidate within it, did not go through.

use domains::DomainError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    /// An identity, session or the connected population could not be read
    #[error("resolution failed: {0}")]
    Resolution(DomainError),

    /// The ban record could not be created
    #[error("ban record not created: {0}")]
    Persistence(DomainError),

    /// The identity's active-ban reference could not be written
    #[error("active ban not recorded: {0}")]
    Mutation(DomainError),

    /// The identity was banned but its connection could not be closed
    #[error("disconnect failed: {0}")]
    Enforcement(DomainError),
}
