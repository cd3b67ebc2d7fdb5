//! # Ports
//!
//! The collaborators the ban engine talks to. The host game server provides
//! the live implementations; `storage-adapters` ships in-memory ones.

use async_trait::async_trait;
use uuid::Uuid;

use crate::address::Address;
use crate::errors::DomainResult;
use crate::models::{Ban, BanId, Identity, LiveSession, NewBan, Session};

/// Identity records and their active-ban reference.
///
/// Writes to the active-ban reference must be visible to every later read of
/// the same identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    async fn find_by_key(&self, key: Uuid) -> DomainResult<Option<Identity>>;

    /// Creates a bare record. Fails with `Conflict` if the key exists.
    async fn create_from_key(&self, key: Uuid) -> DomainResult<Identity>;

    /// Creates a record seeded from a connected player.
    async fn create_from_live_session(&self, live: &LiveSession) -> DomainResult<Identity>;

    /// Unconditionally points the identity at `ban`.
    async fn set_active_ban(&self, key: Uuid, ban: BanId) -> DomainResult<()>;

    /// Points the identity at `ban` only if it has no active ban, as one
    /// atomic step. Returns whether the write happened.
    async fn set_active_ban_if_unbanned(&self, key: Uuid, ban: BanId) -> DomainResult<bool>;

    async fn active_ban(&self, key: Uuid) -> DomainResult<Option<BanId>>;
}

/// Session history per identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Most recent session by start time. A connected identity always has one.
    async fn latest_session(&self, key: Uuid) -> DomainResult<Option<Session>>;

    /// Every recorded session whose address may fall under `target`.
    /// Implementations may over-approximate; callers re-check each address.
    async fn historic_sessions(&self, target: &Address) -> DomainResult<Vec<Session>>;
}

/// The host server's live connections.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ConnectionEnforcer: Send + Sync {
    /// Snapshot of the keys connected right now.
    async fn connected_identities(&self) -> DomainResult<Vec<Uuid>>;

    async fn live_session(&self, key: Uuid) -> DomainResult<Option<LiveSession>>;

    async fn is_connected(&self, key: Uuid) -> DomainResult<bool>;

    /// Terminates the connection, showing `message` to the player.
    async fn disconnect(&self, key: Uuid, message: &str) -> DomainResult<()>;
}

/// Persistence for ban records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BanStore: Send + Sync {
    async fn create_ban(&self, ban: NewBan) -> DomainResult<Ban>;

    async fn find_ban(&self, id: BanId) -> DomainResult<Option<Ban>>;
}
