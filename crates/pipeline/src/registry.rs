//! Generic in-memory keyed store.
//!
//! Reference wiring for tests/dev and single-process deployments; a
//! database-backed implementation can replace the typed stores behind the
//! same surface. Reads degrade on a poisoned lock (`None`/empty), writes
//! report it as a conflict.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use saleops_core::{DomainError, DomainResult};

#[derive(Debug)]
pub struct InMemoryRegistry<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryRegistry<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn poisoned() -> DomainError {
    DomainError::conflict("store lock poisoned")
}

impl<K, V> InMemoryRegistry<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Insert a new record; refuses to overwrite an existing key.
    pub fn insert(&self, key: K, value: V) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&key) {
            return Err(DomainError::conflict("record already exists"));
        }
        map.insert(key, value);
        Ok(())
    }

    /// Insert a new record after checking, under the same write lock, that no
    /// existing record matches `conflicts_with`. This is the in-memory form
    /// of a storage-level uniqueness constraint.
    pub fn insert_unless(
        &self,
        key: K,
        value: V,
        conflicts_with: impl Fn(&V) -> bool,
        conflict_msg: &str,
    ) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&key) {
            return Err(DomainError::conflict("record already exists"));
        }
        if map.values().any(|v| conflicts_with(v)) {
            return Err(DomainError::conflict(conflict_msg));
        }
        map.insert(key, value);
        Ok(())
    }

    /// Insert or overwrite.
    pub fn save(&self, key: K, value: V) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    /// Like [`get`](Self::get), but a poisoned lock is reported instead of
    /// read as "absent".
    pub fn try_get(&self, key: &K) -> DomainResult<Option<V>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    pub fn remove(&self, key: &K) -> DomainResult<Option<V>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(key))
    }

    pub fn list(&self) -> Vec<V> {
        self.try_list().unwrap_or_default()
    }

    /// Like [`list`](Self::list), but a poisoned lock is reported instead of
    /// read as "no records". The duplicate-purchase-order guard needs the
    /// distinction.
    pub fn try_list(&self) -> DomainResult<Vec<V>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
