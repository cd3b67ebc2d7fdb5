use async_trait::async_trait;
use dashmap::DashMap;
use domains::{matches, Address, DomainResult, Session, SessionDirectory};
use uuid::Uuid;

/// Session history keyed by identity.
#[derive(Debug, Default)]
pub struct InMemorySessionDirectory {
    sessions: DashMap<Uuid, Vec<Session>>,
}

impl InMemorySessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, session: Session) {
        self.sessions
            .entry(session.identity)
            .or_default()
            .push(session);
    }
}

#[async_trait]
impl SessionDirectory for InMemorySessionDirectory {
    async fn latest_session(&self, key: Uuid) -> DomainResult<Option<Session>> {
        Ok(self
            .sessions
            .get(&key)
            .and_then(|history| history.iter().max_by_key(|s| s.started_at).cloned()))
    }

    async fn historic_sessions(&self, target: &Address) -> DomainResult<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .flat_map(|history| {
                history
                    .iter()
                    .filter(|s| matches(target, &s.address))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect())
    }
}
