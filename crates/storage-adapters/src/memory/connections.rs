use async_trait::async_trait;
use dashmap::DashMap;
use domains::{ConnectionEnforcer, DomainError, DomainResult, LiveSession};
use uuid::Uuid;

/// Stand-in for the host server's player list. Disconnects remove the
/// player and keep the message they were shown.
#[derive(Debug, Default)]
pub struct InMemoryConnections {
    online: DashMap<Uuid, LiveSession>,
    kicks: DashMap<Uuid, Vec<String>>,
}

impl InMemoryConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, live: LiveSession) {
        self.online.insert(live.key, live);
    }

    /// Player left on their own.
    pub fn leave(&self, key: Uuid) {
        self.online.remove(&key);
    }

    pub fn is_online(&self, key: Uuid) -> bool {
        self.online.contains_key(&key)
    }

    /// Messages shown to `key` on disconnect, oldest first.
    pub fn kicks_for(&self, key: Uuid) -> Vec<String> {
        self.kicks.get(&key).map(|k| k.value().clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionEnforcer for InMemoryConnections {
    async fn connected_identities(&self) -> DomainResult<Vec<Uuid>> {
        Ok(self.online.iter().map(|entry| *entry.key()).collect())
    }

    async fn live_session(&self, key: Uuid) -> DomainResult<Option<LiveSession>> {
        Ok(self.online.get(&key).map(|r| r.value().clone()))
    }

    async fn is_connected(&self, key: Uuid) -> DomainResult<bool> {
        Ok(self.online.contains_key(&key))
    }

    async fn disconnect(&self, key: Uuid, message: &str) -> DomainResult<()> {
        if self.online.remove(&key).is_none() {
            return Err(DomainError::Unavailable(format!("{key} is not connected")));
        }
        tracing::info!(%key, reason = message, "player disconnected");
        self.kicks.entry(key).or_default().push(message.to_string());
        Ok(())
    }
}
