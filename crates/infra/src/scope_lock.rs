//! Per-scope write serialization.
//!
//! A write that reads its siblings (ordering assignment, slug dedupe, tree
//! mutation) holds the lock of its scope from the sibling read to the store
//! write. Different scopes never contend.
//!
//! Entries exist only while some caller holds or waits on them; the last one
//! out removes the entry, so deleted scopes leave nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use catalog_core::EntityId;

/// A scope: the kind of parent plus the parent's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeKey {
    pub kind: &'static str,
    pub id: EntityId,
}

impl ScopeKey {
    pub fn new(kind: &'static str, id: impl Into<uuid::Uuid>) -> Self {
        Self {
            kind,
            id: EntityId::from_uuid(id.into()),
        }
    }
}

type Slot = Arc<Mutex<()>>;

/// Registry of scope mutexes, created on first use and dropped when idle.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: Mutex<HashMap<ScopeKey, Slot>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock of `key`.
    pub fn with<R>(&self, key: ScopeKey, f: impl FnOnce() -> R) -> R {
        self.with_all(&[key], f)
    }

    /// Run `f` while holding the locks of every key in `keys`.
    ///
    /// Keys are taken in sorted order, so two callers locking overlapping sets
    /// cannot deadlock on each other. Duplicates are taken once.
    pub fn with_all<R>(&self, keys: &[ScopeKey], f: impl FnOnce() -> R) -> R {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys.dedup();

        let slots: Vec<(ScopeKey, Slot)> = {
            let mut locks = self.registry();
            keys.into_iter()
                .map(|key| (key, locks.entry(key).or_default().clone()))
                .collect()
        };

        let out = {
            let _guards: Vec<MutexGuard<'_, ()>> = slots
                .iter()
                .map(|(_, slot)| slot.lock().unwrap_or_else(PoisonError::into_inner))
                .collect();
            f()
        };

        self.release(slots);
        out
    }

    /// Drop registry entries nobody else holds or waits on.
    ///
    /// Clones are only handed out under the registry lock, so a strong count
    /// of two (registry + ours) observed under that lock means no one else
    /// can reach the slot.
    fn release(&self, slots: Vec<(ScopeKey, Slot)>) {
        let mut locks = self.registry();
        for (key, slot) in slots {
            let idle = locks
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2);
            drop(slot);
            if idle {
                locks.remove(&key);
            }
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<ScopeKey, Slot>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of scopes currently held or waited on.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
