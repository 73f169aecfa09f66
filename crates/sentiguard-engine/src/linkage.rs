//! Account linkage: binding a parent's subscription to pool credentials

use sentiguard_core::{Error, LinkedChild, Result};
use sentiguard_store::Store;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct LinkageService {
    store: Arc<dyn Store>,
}

impl LinkageService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Subscribe `parent` to `handle`.
    ///
    /// Copies credentials from the monitored-account pool when the handle is
    /// pre-authorized; otherwise the subscription stays pending until a later
    /// [`verify_child`](Self::verify_child). Idempotent: repeat calls update
    /// credentials in place on the existing (parent, handle) row.
    pub fn link_child(&self, parent_id: Uuid, handle: &str) -> Result<LinkedChild> {
        let mut child = self
            .store
            .child_by_handle(&parent_id, handle)
            .unwrap_or_else(|| LinkedChild::pending(parent_id, handle));

        if let Some(account) = self.store.account_by_handle(handle) {
            child.external_id = Some(account.external_id);
            child.access_token = Some(account.access_token);
        }

        self.store.upsert_child(child.clone())?;
        info!(
            handle,
            linked = child.credentials().is_some(),
            "child subscription upserted"
        );
        Ok(child)
    }

    /// Like [`link_child`](Self::link_child), but the handle must be in the
    /// pre-authorized pool; rejects with `NotConfigured` otherwise.
    pub fn verify_child(&self, parent_id: Uuid, handle: &str) -> Result<LinkedChild> {
        if self.store.account_by_handle(handle).is_none() {
            return Err(Error::NotConfigured(handle.to_string()));
        }
        self.link_child(parent_id, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiguard_core::MonitoredAccount;
    use sentiguard_store::MemoryStore;

    fn service_with_pool() -> LinkageService {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_account(MonitoredAccount {
                external_id: "1".to_string(),
                handle: "kid1".to_string(),
                access_token: "T".to_string(),
            })
            .unwrap();
        LinkageService::new(store)
    }

    #[test]
    fn test_link_copies_pool_credentials() {
        let service = service_with_pool();
        let parent = Uuid::new_v4();

        let child = service.link_child(parent, "kid1").unwrap();
        assert_eq!(child.credentials(), Some(("1", "T")));
    }

    #[test]
    fn test_link_unknown_handle_is_pending() {
        let service = service_with_pool();
        let child = service.link_child(Uuid::new_v4(), "somebody").unwrap();
        assert!(child.credentials().is_none());
    }

    #[test]
    fn test_link_is_idempotent() {
        let service = service_with_pool();
        let parent = Uuid::new_v4();

        let first = service.link_child(parent, "kid1").unwrap();
        let second = service.link_child(parent, "kid1").unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_verify_rejects_unconfigured_handle() {
        let service = service_with_pool();
        let result = service.verify_child(Uuid::new_v4(), "somebody");
        assert!(matches!(result, Err(Error::NotConfigured(_))));
    }

    #[test]
    fn test_verify_links_credentials_in_place() {
        let service = service_with_pool();
        let parent = Uuid::new_v4();

        // Subscribe before the handle's credentials matter
        let pending = service.link_child(parent, "kid2").unwrap();
        assert!(pending.credentials().is_none());

        service
            .store
            .seed_account(MonitoredAccount {
                external_id: "2".to_string(),
                handle: "kid2".to_string(),
                access_token: "U".to_string(),
            })
            .unwrap();

        let verified = service.verify_child(parent, "kid2").unwrap();
        assert_eq!(verified.id, pending.id);
        assert_eq!(verified.credentials(), Some(("2", "U")));
    }
}
