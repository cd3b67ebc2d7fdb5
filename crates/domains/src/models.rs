//! # Domain Models
//!
//! These structs represent the records the ban engine reads and writes.
//! Identities are keyed by the player's stable account UUID; bans get a
//! random v4 id from whichever store persists them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;

/// Identifier of a persisted [`Ban`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BanId(pub Uuid);

impl BanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account key
    pub key: Uuid,
    /// Last known display name, if the record was seeded from a live session
    pub name: Option<String>,
    /// The ban currently restricting this identity. `Some` means banned.
    pub active_ban: Option<BanId>,
    pub first_seen: DateTime<Utc>,
}

impl Identity {
    /// A bare record known only by its key.
    pub fn from_key(key: Uuid) -> Self {
        Self {
            key,
            name: None,
            active_ban: None,
            first_seen: Utc::now(),
        }
    }

    /// A record seeded from a player who is connected right now.
    pub fn from_live_session(live: &LiveSession) -> Self {
        Self {
            key: live.key,
            name: Some(live.name.clone()),
            active_ban: None,
            first_seen: live.connected_at,
        }
    }

    pub fn is_banned(&self) -> bool {
        self.active_ban.is_some()
    }
}

/// One connection instance of an identity, as recorded by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Uuid,
    /// Always a host address, never a range
    pub address: Address,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// What the host server knows about a currently-connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSession {
    pub key: Uuid,
    pub name: String,
    pub address: Address,
    pub connected_at: DateTime<Utc>,
}

/// A persisted restriction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ban {
    pub id: BanId,
    pub reason: String,
    /// `None` means the ban never expires
    pub ends_at: Option<DateTime<Utc>>,
    pub admin: bool,
    /// Present for address and range bans, absent for identity bans
    pub target: Option<Address>,
    pub created_at: DateTime<Utc>,
}

impl Ban {
    pub fn is_permanent(&self) -> bool {
        self.ends_at.is_none()
    }
}

/// Input to `BanStore::create_ban`; the store assigns id and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBan {
    pub reason: String,
    pub ends_at: Option<DateTime<Utc>>,
    pub admin: bool,
    pub target: Option<Address>,
}

impl NewBan {
    /// Materializes the record with a fresh id, stamped now.
    pub fn into_ban(self) -> Ban {
        Ban {
            id: BanId::new(),
            reason: self.reason,
            ends_at: self.ends_at,
            admin: self.admin,
            target: self.target,
            created_at: Utc::now(),
        }
    }
}
