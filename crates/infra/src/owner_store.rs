use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use catalog_core::{Entity, OwnerId};
use catalog_products::Validated;

/// Owner-partitioned row store.
///
/// Writes only accept [`Validated`] rows, so nothing reaches the store without
/// passing its entity's validation routine first.
pub trait OwnerStore<V: Entity>: Send + Sync {
    fn get(&self, owner: OwnerId, id: &V::Id) -> Option<V>;

    /// Insert or replace the row with the same id; returns the stored row.
    fn save(&self, owner: OwnerId, row: Validated<V>) -> V;

    fn remove(&self, owner: OwnerId, id: &V::Id) -> Option<V>;

    fn list(&self, owner: OwnerId) -> Vec<V>;

    /// Remove every row of `owner` matching `pred`; returns the removed rows.
    fn remove_where(&self, owner: OwnerId, pred: &dyn Fn(&V) -> bool) -> Vec<V>;
}

/// In-memory owner-partitioned store.
#[derive(Debug)]
pub struct InMemoryOwnerStore<V: Entity> {
    inner: RwLock<HashMap<(OwnerId, V::Id), V>>,
}

impl<V: Entity> InMemoryOwnerStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Entity> Default for InMemoryOwnerStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OwnerStore<V> for InMemoryOwnerStore<V>
where
    V: Entity + Clone + Send + Sync + 'static,
    V::Id: Send + Sync,
{
    fn get(&self, owner: OwnerId, id: &V::Id) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(owner, id.clone())).cloned()
    }

    fn save(&self, owner: OwnerId, row: Validated<V>) -> V {
        let row = row.into_inner();
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert((owner, row.id().clone()), row.clone());
        row
    }

    fn remove(&self, owner: OwnerId, id: &V::Id) -> Option<V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(&(owner, id.clone()))
    }

    fn list(&self, owner: OwnerId) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.iter()
            .filter_map(|((o, _id), v)| if *o == owner { Some(v.clone()) } else { None })
            .collect()
    }

    fn remove_where(&self, owner: OwnerId, pred: &dyn Fn(&V) -> bool) -> Vec<V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let doomed: Vec<(OwnerId, V::Id)> = map
            .iter()
            .filter(|((o, _id), v)| *o == owner && pred(v))
            .map(|(key, _v)| key.clone())
            .collect();
        doomed.into_iter().filter_map(|key| map.remove(&key)).collect()
    }
}
