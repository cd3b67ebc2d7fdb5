//! # BanResult
//!
//! What one ban operation did: the bans it created, the identities it
//! banned, and whatever went wrong along the way.

use domains::{Ban, Identity};
use uuid::Uuid;

use crate::error::IssueError;

/// A candidate identity the operation could not finish with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub identity: Uuid,
    pub error: IssueError,
}

/// Append-only record of a single operation. Deduplication is the issuer's
/// job; this type stores what it is given in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanResult {
    bans: Vec<Ban>,
    players: Vec<Identity>,
    failures: Vec<CandidateFailure>,
    error: Option<IssueError>,
}

impl BanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty result carrying the error that stopped the operation.
    pub fn failed(error: IssueError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn add_ban(&mut self, ban: Ban) {
        self.bans.push(ban);
    }

    pub fn add_player(&mut self, identity: Identity) {
        self.players.push(identity);
    }

    pub fn add_failure(&mut self, identity: Uuid, error: IssueError) {
        self.failures.push(CandidateFailure { identity, error });
    }

    /// Records an operation-level error. The first one wins.
    pub fn set_error(&mut self, error: IssueError) {
        self.error.get_or_insert(error);
    }

    pub fn bans(&self) -> &[Ban] {
        &self.bans
    }

    pub fn players(&self) -> &[Identity] {
        &self.players
    }

    pub fn failures(&self) -> &[CandidateFailure] {
        &self.failures
    }

    pub fn error(&self) -> Option<&IssueError> {
        self.error.as_ref()
    }

    pub fn contains_player(&self, key: Uuid) -> bool {
        self.players.iter().any(|p| p.key == key)
    }

    /// Nothing was banned.
    pub fn is_empty(&self) -> bool {
        self.bans.is_empty() && self.players.is_empty()
    }

    /// Nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.failures.is_empty()
    }
}
