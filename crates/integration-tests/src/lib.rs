//! Shared fixtures: a [`BanIssuer`] wired to the in-memory adapters, plus
//! helpers to put players online.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use configs::BanSettings;
use domains::{Address, BanId, Identity, LiveSession, Session};
use services::BanIssuer;
use storage_adapters::{
    InMemoryBanStore, InMemoryConnections, InMemoryIdentityRegistry, InMemorySessionDirectory,
};
use uuid::Uuid;

pub struct Harness {
    pub registry: Arc<InMemoryIdentityRegistry>,
    pub sessions: Arc<InMemorySessionDirectory>,
    pub connections: Arc<InMemoryConnections>,
    pub bans: Arc<InMemoryBanStore>,
    pub issuer: BanIssuer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(BanSettings::default())
    }

    pub fn with_settings(settings: BanSettings) -> Self {
        let registry = Arc::new(InMemoryIdentityRegistry::new());
        let sessions = Arc::new(InMemorySessionDirectory::new());
        let connections = Arc::new(InMemoryConnections::new());
        let bans = Arc::new(InMemoryBanStore::new());
        let issuer = BanIssuer::new(
            registry.clone(),
            sessions.clone(),
            connections.clone(),
            bans.clone(),
            settings,
        );
        Self {
            registry,
            sessions,
            connections,
            bans,
            issuer,
        }
    }

    /// Registers a player, records a session from `addr` and puts them
    /// online. Returns their key.
    pub fn connect(&self, name: &str, addr: &str) -> Uuid {
        let live = LiveSession {
            key: Uuid::new_v4(),
            name: name.to_string(),
            address: parse(addr),
            connected_at: Utc::now(),
        };
        self.registry.insert(Identity::from_live_session(&live));
        self.record_session(live.key, addr, live.connected_at);
        self.connections.connect(live.clone());
        live.key
    }

    /// A player who is known and once played from `addr` but is offline.
    pub fn past_player(&self, addr: &str, at: DateTime<Utc>) -> Uuid {
        let key = Uuid::new_v4();
        self.registry.insert(Identity::from_key(key));
        self.record_session(key, addr, at);
        key
    }

    pub fn record_session(&self, key: Uuid, addr: &str, at: DateTime<Utc>) {
        self.sessions.record(Session {
            identity: key,
            address: parse(addr),
            started_at: at,
            ended_at: None,
        });
    }

    /// Gives `key` an active ban that did not come from the issuer.
    pub fn pre_ban(&self, key: Uuid) -> BanId {
        let ban = BanId::new();
        let mut identity = self.registry.get(key).unwrap_or_else(|| Identity::from_key(key));
        identity.active_ban = Some(ban);
        self.registry.insert(identity);
        ban
    }

    pub fn active_ban(&self, key: Uuid) -> Option<BanId> {
        self.registry.get(key).and_then(|i| i.active_ban)
    }

    pub fn is_online(&self, key: Uuid) -> bool {
        self.connections.is_online(key)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a fixture address, panicking on typos.
pub fn parse(addr: &str) -> Address {
    addr.parse()
        .unwrap_or_else(|e| panic!("bad fixture address {addr}: {e}"))
}
