//! Per-child ingestion serialization
//!
//! Dedup is the final authority against duplicate storage, but overlapping
//! runs on the same child would still duplicate upstream calls and model
//! invocations. One async mutex per child serializes them; different
//! children proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct ChildLocks {
    inner: parking_lot::Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ChildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one child, waiting out any in-flight run.
    ///
    /// Entries whose lock is no longer held anywhere else are dropped on the
    /// way in, so the map stays bounded by the number of in-flight runs
    /// rather than growing with every child ever ingested.
    pub async fn acquire(&self, child_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.retain(|id, lock| *id == child_id || Arc::strong_count(lock) > 1);
            map.entry(child_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().len()
    }
}
