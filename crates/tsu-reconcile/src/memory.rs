//! In-process snapshot store.
//!
//! Replaces are atomic: the new map is built off to the side and swapped in.
//! Faults can be injected so callers can exercise the failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tsu_schemas::PlayerEntity;

use crate::store::{ReplaceOutcome, SnapshotStore, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFault {
    #[default]
    None,
    /// `ping` fails.
    Unreachable,
    /// `replace_all` fails after the clear step; the swap never happens.
    FailOnReplace,
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    rows: Mutex<BTreeMap<i64, PlayerEntity>>,
    fault: Mutex<StoreFault>,
    replace_calls: AtomicU64,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `entities` (later duplicates win).
    pub fn with_rows(entities: impl IntoIterator<Item = PlayerEntity>) -> Self {
        let store = Self::new();
        if let Ok(mut rows) = store.rows.lock() {
            for e in entities {
                rows.insert(e.player_id, e);
            }
        }
        store
    }

    pub fn set_fault(&self, fault: StoreFault) {
        if let Ok(mut f) = self.fault.lock() {
            *f = fault;
        }
    }

    /// Number of `replace_all` calls that reached the store, failed ones included.
    pub fn replace_calls(&self) -> u64 {
        self.replace_calls.load(Ordering::SeqCst)
    }

    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<i64, PlayerEntity>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::new("memory store lock poisoned"))
    }

    fn fault(&self) -> StoreFault {
        self.fault.lock().map(|f| *f).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn ping(&self) -> Result<(), StoreError> {
        match self.fault() {
            StoreFault::Unreachable => Err(StoreError::new("memory store unreachable (injected)")),
            _ => Ok(()),
        }
    }

    async fn replace_all(&self, entities: &[PlayerEntity]) -> Result<ReplaceOutcome, StoreError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows()?;

        let mut next = BTreeMap::new();
        for e in entities {
            next.insert(e.player_id, e.clone());
        }

        if self.fault() == StoreFault::FailOnReplace {
            return Err(StoreError::new("bulk upsert failed (injected)"));
        }

        let cleared = rows.len() as u64;
        *rows = next;
        Ok(ReplaceOutcome {
            cleared,
            upserted: entities.len() as u64,
        })
    }

    async fn load_all(&self) -> Result<Vec<PlayerEntity>, StoreError> {
        Ok(self.rows()?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: i64, name: &str) -> PlayerEntity {
        PlayerEntity {
            player_name: name.to_string(),
            player_id: id,
            total_entries: 0,
            entries: Vec::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_ids_last_one_wins() {
        let store = MemorySnapshotStore::new();
        let out = store
            .replace_all(&[p(1, "first"), p(2, "other"), p(1, "second")])
            .await
            .unwrap();
        assert_eq!(out.upserted, 3);
        let rows = store.load_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name, "second");
    }

    #[tokio::test]
    async fn load_all_is_ordered_by_id() {
        let store = MemorySnapshotStore::with_rows([p(30, "c"), p(10, "a"), p(20, "b")]);
        let ids: Vec<_> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.player_id)
            .collect();
        assert_eq!(ids, [10, 20, 30]);
    }

    #[tokio::test]
    async fn injected_ping_fault() {
        let store = MemorySnapshotStore::new();
        assert!(store.ping().await.is_ok());
        store.set_fault(StoreFault::Unreachable);
        assert!(store.ping().await.is_err());
    }
}
