use std::sync::Arc;

use bytes::Bytes;

use crate::error::StoreResult;

/// Key-addressed blob store with eventual read-after-write consistency.
///
/// All implementations must satisfy these invariants:
/// - `get` and `delete` on a missing key return [`StoreError::NotFound`].
/// - `put` overwrites any existing object at the key.
/// - `iter` visits each object directly inside `dir` at most once and does
///   not descend into sub-directories. A missing directory is empty.
/// - The store never interprets object contents.
///
/// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
pub trait ObjectStore: Send + Sync {
    /// Read the full contents of the object at `key`.
    fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Write `data` to `key`, replacing any previous object.
    fn put(&self, key: &str, data: Bytes) -> StoreResult<()>;

    /// Remove the object at `key`.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Check whether an object exists at `key`.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Call `visit` with the full key of every object directly inside `dir`.
    ///
    /// An error returned by `visit` stops the iteration and is propagated.
    fn iter(&self, dir: &str, visit: &mut dyn FnMut(&str) -> StoreResult<()>) -> StoreResult<()>;

    /// Collect the keys visited by [`ObjectStore::iter`].
    fn list(&self, dir: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        self.iter(dir, &mut |key| {
            keys.push(key.to_string());
            Ok(())
        })?;
        Ok(keys)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Bytes> {
        (**self).get(key)
    }

    fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        (**self).put(key, data)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn iter(&self, dir: &str, visit: &mut dyn FnMut(&str) -> StoreResult<()>) -> StoreResult<()> {
        (**self).iter(dir, visit)
    }
}
