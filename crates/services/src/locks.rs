//! Per-identity write serialization inside one issuer.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per identity key, created on demand.
#[derive(Debug, Default)]
pub(crate) struct IdentityLocks {
    slots: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl IdentityLocks {
    /// Waits until no other operation holds `key`.
    pub(crate) async fn lock(&self, key: Uuid) -> OwnedMutexGuard<()> {
        // Clone out of the map so no shard lock is held across the await.
        let slot = self.slots.entry(key).or_default().clone();
        slot.lock_owned().await
    }

    /// Drops slots nobody is holding or waiting on.
    pub(crate) fn prune(&self) {
        self.slots.retain(|_, slot| Arc::strong_count(slot) > 1);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(IdentityLocks::default());
        let key = Uuid::new_v4();

        let guard = locks.lock(key).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock(key).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block() {
        let locks = IdentityLocks::default();
        let _a = locks.lock(Uuid::new_v4()).await;
        let _b = locks.lock(Uuid::new_v4()).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn prune_keeps_held_slots() {
        let locks = IdentityLocks::default();
        let held = locks.lock(Uuid::new_v4()).await;
        drop(locks.lock(Uuid::new_v4()).await);

        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(held);
        locks.prune();
        assert_eq!(locks.len(), 0);
    }
}
