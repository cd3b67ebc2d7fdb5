use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{BanId, DomainError, DomainResult, Identity, IdentityRegistry, LiveSession};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryIdentityRegistry {
    identities: DashMap<Uuid, Identity>,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, identity: Identity) {
        self.identities.insert(identity.key, identity);
    }

    pub fn get(&self, key: Uuid) -> Option<Identity> {
        self.identities.get(&key).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    fn create(&self, identity: Identity) -> DomainResult<Identity> {
        match self.identities.entry(identity.key) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "identity {} already exists",
                identity.key
            ))),
            Entry::Vacant(slot) => {
                tracing::debug!(key = %identity.key, "identity created");
                slot.insert(identity.clone());
                Ok(identity)
            }
        }
    }

    fn not_found(key: Uuid) -> DomainError {
        DomainError::NotFound("identity".to_string(), key.to_string())
    }
}

#[async_trait]
impl IdentityRegistry for InMemoryIdentityRegistry {
    async fn find_by_key(&self, key: Uuid) -> DomainResult<Option<Identity>> {
        Ok(self.get(key))
    }

    async fn create_from_key(&self, key: Uuid) -> DomainResult<Identity> {
        self.create(Identity::from_key(key))
    }

    async fn create_from_live_session(&self, live: &LiveSession) -> DomainResult<Identity> {
        self.create(Identity::from_live_session(live))
    }

    async fn set_active_ban(&self, key: Uuid, ban: BanId) -> DomainResult<()> {
        let mut identity = self
            .identities
            .get_mut(&key)
            .ok_or_else(|| Self::not_found(key))?;
        identity.active_ban = Some(ban);
        Ok(())
    }

    async fn set_active_ban_if_unbanned(&self, key: Uuid, ban: BanId) -> DomainResult<bool> {
        let mut identity = self
            .identities
            .get_mut(&key)
            .ok_or_else(|| Self::not_found(key))?;
        if identity.active_ban.is_some() {
            return Ok(false);
        }
        identity.active_ban = Some(ban);
        Ok(true)
    }

    async fn active_ban(&self, key: Uuid) -> DomainResult<Option<BanId>> {
        self.identities
            .get(&key)
            .map(|identity| identity.active_ban)
            .ok_or_else(|| Self::not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_create_conflicts() {
        let registry = InMemoryIdentityRegistry::new();
        let key = Uuid::new_v4();
        registry.create_from_key(key).await.unwrap();
        assert!(matches!(
            registry.create_from_key(key).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn conditional_write_only_lands_once() {
        let registry = InMemoryIdentityRegistry::new();
        let key = Uuid::new_v4();
        registry.create_from_key(key).await.unwrap();

        let first = BanId::new();
        assert!(registry.set_active_ban_if_unbanned(key, first).await.unwrap());
        assert!(!registry
            .set_active_ban_if_unbanned(key, BanId::new())
            .await
            .unwrap());
        assert_eq!(registry.active_ban(key).await.unwrap(), Some(first));

        let second = BanId::new();
        registry.set_active_ban(key, second).await.unwrap();
        assert_eq!(registry.active_ban(key).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn writes_to_unknown_identity_fail() {
        let registry = InMemoryIdentityRegistry::new();
        assert!(matches!(
            registry.set_active_ban(Uuid::new_v4(), BanId::new()).await,
            Err(DomainError::NotFound(_, _))
        ));
    }
}
