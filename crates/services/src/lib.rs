//! # services
//!
//! The ban engine: issues bans through the domain ports and reports what
//! happened.

pub mod ban_issuer;
pub mod ban_result;
pub mod error;
pub mod message;

mod locks;

pub use ban_issuer::BanIssuer;
pub use ban_result::{BanResult, CandidateFailure};
pub use error::IssueError;
pub use message::{kick_message, resolve_reason, END_TIME_FORMAT};
