use std::collections::BTreeMap;
use std::sync::RwLock;

use bytes::Bytes;

use crate::error::{StoreError, StoreResult};
use crate::key::{is_direct_child, validate_key};
use crate::traits::ObjectStore;

/// In-memory, `BTreeMap`-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Iteration visits keys in sorted order.
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, key: &str) -> StoreResult<Bytes> {
        validate_key(key)?;
        let map = self.objects.read().expect("lock poisoned");
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(key.to_string(), data);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.objects.write().expect("lock poisoned");
        map.remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn iter(&self, dir: &str, visit: &mut dyn FnMut(&str) -> StoreResult<()>) -> StoreResult<()> {
        // Snapshot the matching keys so `visit` may call back into the store.
        let keys: Vec<String> = {
            let map = self.objects.read().expect("lock poisoned");
            map.keys()
                .filter(|key| is_direct_child(dir, key))
                .cloned()
                .collect()
        };
        for key in &keys {
            visit(key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
