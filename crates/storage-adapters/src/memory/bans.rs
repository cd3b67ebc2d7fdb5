use async_trait::async_trait;
use dashmap::DashMap;
use domains::{Ban, BanId, BanStore, DomainResult, NewBan};

#[derive(Debug, Default)]
pub struct InMemoryBanStore {
    bans: DashMap<BanId, Ban>,
}

impl InMemoryBanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}

#[async_trait]
impl BanStore for InMemoryBanStore {
    async fn create_ban(&self, ban: NewBan) -> DomainResult<Ban> {
        let ban = ban.into_ban();
        tracing::debug!(id = %ban.id, admin = ban.admin, "ban stored");
        self.bans.insert(ban.id, ban.clone());
        Ok(ban)
    }

    async fn find_ban(&self, id: BanId) -> DomainResult<Option<Ban>> {
        Ok(self.bans.get(&id).map(|r| r.value().clone()))
    }
}
