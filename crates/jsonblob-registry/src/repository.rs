use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use jsonblob_store::{ObjectStore, StoreError};
use jsonblob_types::{Resource, ResourceIdentity, ResourceKey, ResourceList};
use jsonblob_watch::{ChangeEvent, Watch, WatchHub};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{Codec, JsonCodec};
use crate::error::{RegistryError, RegistryResult};
use crate::filter::ListFilter;
use crate::paths;
use crate::validation::Validators;

const KEY_LOCK_STRIPES: usize = 64;

/// Striped per-path mutexes serializing mutations of the same blob.
struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    fn new() -> Self {
        Self {
            stripes: (0..KEY_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn lock(&self, path: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        let idx = (hasher.finish() % self.stripes.len() as u64) as usize;
        self.stripes[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of [`Repository::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOutcome<R> {
    pub object: R,
    /// `true` when the key was absent and the update created it.
    pub created: bool,
}

/// CRUD engine for one resource kind.
///
/// Each object lives in its own blob at a path derived from the kind's
/// identity and the object's key. Every successful mutation is broadcast to
/// the hub right after its write, while the per-path lock is still held, so
/// events for one key reach each subscriber in completion order.
///
/// Collaborators are supplied by the caller: the object store, the codec,
/// the watch hub and optional validators.
pub struct Repository<R: Resource, S, C = JsonCodec> {
    identity: ResourceIdentity,
    store: S,
    codec: C,
    hub: WatchHub<R>,
    validators: Validators<R>,
    key_locks: KeyLocks,
}

impl<R, S, C> fmt::Debug for Repository<R, S, C>
where
    R: Resource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("identity", &self.identity)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}

impl<R, S, C> Repository<R, S, C>
where
    R: Resource,
    S: ObjectStore,
    C: Codec<R>,
{
    pub fn new(store: S, codec: C, hub: WatchHub<R>) -> Self {
        Self {
            identity: R::identity(),
            store,
            codec,
            hub,
            validators: Validators::new(),
            key_locks: KeyLocks::new(),
        }
    }

    /// Install admission hooks.
    pub fn with_validators(mut self, validators: Validators<R>) -> Self {
        self.validators = validators;
        self
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hub(&self) -> &WatchHub<R> {
        &self.hub
    }

    /// Blob path for `key`.
    pub fn path_for(&self, key: &ResourceKey) -> RegistryResult<String> {
        paths::file_with_suffix(
            &self.identity,
            key.namespace(),
            &key.name,
            self.codec.suffix(),
        )
    }

    /// Fetch one object.
    pub fn get(&self, key: &ResourceKey) -> RegistryResult<R> {
        let path = self.path_for(key)?;
        self.read(&path, key)
    }

    /// Every object in `namespace` accepted by `filter`, in store iteration
    /// order. Any failure aborts the whole list.
    pub fn list(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> RegistryResult<R::List> {
        let dir = paths::directory_for(&self.identity, namespace)?;
        let mut list = R::new_list();
        self.scan(&dir, |_, object| {
            if filter.matches(object.metadata()) {
                list.push(object);
            }
            Ok(())
        })?;
        debug!(resource = %self.identity, dir = %dir, count = list.len(), "listed");
        Ok(list)
    }

    /// Store a new object at `key`.
    ///
    /// Empty name or namespace in the object's metadata are filled from
    /// `key`; values that disagree with it are rejected. A fresh `uid` and
    /// `creation_timestamp` are assigned when missing.
    pub fn create(&self, key: &ResourceKey, mut object: R) -> RegistryResult<R> {
        let path = self.path_for(key)?;
        self.bind_key(key, &mut object)?;
        stamp_new(&mut object);
        self.validators.validate_create(&object)?;

        let _guard = self.key_locks.lock(&path);
        let exists = self
            .store
            .exists(&path)
            .map_err(|e| RegistryError::backend("exists", &path, e))?;
        if exists {
            return Err(RegistryError::AlreadyExists {
                resource: self.identity.to_string(),
                key: key.to_string(),
            });
        }
        self.write(&path, &object)?;
        self.hub.broadcast(ChangeEvent::added(object.clone()));

        debug!(resource = %self.identity, path = %path, "created");
        Ok(object)
    }

    /// Read-modify-write of the object at `key`.
    ///
    /// `mutator` receives the stored object, or `None` when the key is
    /// absent and `force_create` is set, and returns the object to store.
    /// Without `force_create` an absent key is `NotFound` and nothing is
    /// written. `uid` and `creation_timestamp` of an existing object are
    /// carried over.
    ///
    /// The path lock is held while `mutator` runs; it must not call back
    /// into this repository.
    pub fn update<F>(
        &self,
        key: &ResourceKey,
        force_create: bool,
        mutator: F,
    ) -> RegistryResult<UpdateOutcome<R>>
    where
        F: FnOnce(Option<&R>) -> RegistryResult<R>,
    {
        let path = self.path_for(key)?;
        let _guard = self.key_locks.lock(&path);

        let existing = match self.read(&path, key) {
            Ok(object) => Some(object),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        match existing {
            None if !force_create => Err(self.not_found(key)),
            None => {
                let mut object = mutator(None)?;
                self.bind_key(key, &mut object)?;
                stamp_new(&mut object);
                self.validators.validate_create(&object)?;
                self.write(&path, &object)?;
                self.hub.broadcast(ChangeEvent::added(object.clone()));

                debug!(resource = %self.identity, path = %path, "created by update");
                Ok(UpdateOutcome {
                    object,
                    created: true,
                })
            }
            Some(old) => {
                let mut object = mutator(Some(&old))?;
                self.bind_key(key, &mut object)?;
                {
                    let (old_meta, meta) = (old.metadata(), object.metadata_mut());
                    meta.uid = old_meta.uid;
                    meta.creation_timestamp = old_meta.creation_timestamp;
                }
                self.validators.validate_update(&old, &object)?;
                self.write(&path, &object)?;
                self.hub.broadcast(ChangeEvent::modified(object.clone()));

                debug!(resource = %self.identity, path = %path, "updated");
                Ok(UpdateOutcome {
                    object,
                    created: false,
                })
            }
        }
    }

    /// Remove the object at `key` and return it.
    pub fn delete(&self, key: &ResourceKey) -> RegistryResult<R> {
        let path = self.path_for(key)?;
        let _guard = self.key_locks.lock(&path);

        let object = self.read(&path, key)?;
        self.validators.validate_delete(&object)?;
        self.store.delete(&path).map_err(|e| {
            if e.is_not_found() {
                self.not_found(key)
            } else {
                RegistryError::backend("delete", &path, e)
            }
        })?;
        self.hub.broadcast(ChangeEvent::deleted(object.clone()));

        debug!(resource = %self.identity, path = %path, "deleted");
        Ok(object)
    }

    /// Delete every object in `namespace` accepted by `filter`.
    ///
    /// Best effort: a failed delete of one blob is logged and skipped, and
    /// the object is still included in the result. Only successful deletes
    /// are broadcast. A delete validator rejecting an item aborts the call;
    /// items removed before it stay removed.
    ///
    /// Each matched object is removed from the blob it was read from, whatever
    /// its stored metadata says.
    pub fn delete_collection(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> RegistryResult<R::List> {
        let dir = paths::directory_for(&self.identity, namespace)?;

        let mut matched = Vec::new();
        self.scan(&dir, |path, object| {
            if filter.matches(object.metadata()) {
                matched.push((path.to_string(), object));
            }
            Ok(())
        })?;

        let mut deleted = R::new_list();
        let mut failed = 0usize;
        for (path, object) in matched {
            self.validators.validate_delete(&object)?;

            let _guard = self.key_locks.lock(&path);
            match self.store.delete(&path) {
                Ok(()) => {
                    self.hub.broadcast(ChangeEvent::deleted(object.clone()));
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        resource = %self.identity,
                        path = %path,
                        error = %e,
                        "delete failed during collection delete"
                    );
                }
            }
            deleted.push(object);
        }

        debug!(
            resource = %self.identity,
            dir = %dir,
            count = deleted.len(),
            failed,
            "deleted collection"
        );
        Ok(deleted)
    }

    /// Subscribe to changes of objects in `namespace` accepted by `filter`.
    ///
    /// The stream starts with an `Added` event for each object listed at
    /// subscribe time, followed by live events. The listing runs under the
    /// hub's registration lock so no mutation falls between the two. A
    /// mutation that raced the listing may be seen twice, never zero times.
    pub fn watch(&self, namespace: Option<&str>, filter: &ListFilter) -> RegistryResult<Watch<R>> {
        paths::directory_for(&self.identity, namespace)?;

        let scope = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        let live = filter.clone();
        let accepts = move |object: &R| {
            let meta = object.metadata();
            let in_scope = match &scope {
                Some(ns) => meta.namespace.as_deref() == Some(ns.as_str()),
                None => true,
            };
            in_scope && live.matches(meta)
        };

        let watch = self.hub.subscribe_with_snapshot(accepts, || {
            self.list(namespace, filter).map(|l| l.into_items())
        })?;
        debug!(resource = %self.identity, subscription = watch.id(), filter = %filter, "watching");
        Ok(watch)
    }

    fn not_found(&self, key: &ResourceKey) -> RegistryError {
        RegistryError::NotFound {
            resource: self.identity.to_string(),
            key: key.to_string(),
        }
    }

    fn read(&self, path: &str, key: &ResourceKey) -> RegistryResult<R> {
        let data = self.store.get(path).map_err(|e| {
            if e.is_not_found() {
                self.not_found(key)
            } else {
                RegistryError::backend("get", path, e)
            }
        })?;
        self.decode(path, &data)
    }

    fn decode(&self, path: &str, data: &[u8]) -> RegistryResult<R> {
        self.codec
            .decode(data)
            .map_err(|e| RegistryError::CorruptState {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn write(&self, path: &str, object: &R) -> RegistryResult<()> {
        let data = self
            .codec
            .encode(object)
            .map_err(|e| RegistryError::invalid(format!("cannot encode {path}: {e}")))?;
        self.store
            .put(path, data)
            .map_err(|e| RegistryError::backend("put", path, e))
    }

    /// Decode every object directly under `dir` and hand it to `visit`
    /// together with the blob path it was read from.
    ///
    /// Keys without the codec suffix are ignored, and keys that disappear
    /// between iteration and read are skipped.
    fn scan<F>(&self, dir: &str, mut visit: F) -> RegistryResult<()>
    where
        F: FnMut(&str, R) -> RegistryResult<()>,
    {
        let suffix = self.codec.suffix();
        let mut failure: Option<RegistryError> = None;

        let result = self.store.iter(dir, &mut |path| {
            if !path.ends_with(suffix) {
                return Ok(());
            }
            let step = match self.store.get(path) {
                Ok(data) => self
                    .decode(path, &data)
                    .and_then(|object| visit(path, object)),
                Err(e) if e.is_not_found() => {
                    debug!(path = %path, "object vanished during iteration");
                    Ok(())
                }
                Err(e) => Err(RegistryError::backend("get", path, e)),
            };
            step.map_err(|e| {
                failure = Some(e);
                StoreError::Backend("iteration aborted".to_string())
            })
        });

        if let Some(err) = failure {
            return Err(err);
        }
        result.map_err(|e| RegistryError::backend("list", dir, e))
    }

    /// Reconcile the object's metadata with the key it is stored under.
    fn bind_key(&self, key: &ResourceKey, object: &mut R) -> RegistryResult<()> {
        let meta = object.metadata_mut();
        if meta.name.is_empty() {
            meta.name = key.name.clone();
        } else if meta.name != key.name {
            return Err(RegistryError::invalid(format!(
                "metadata.name {:?} does not match {:?}",
                meta.name, key.name
            )));
        }

        let current = meta.namespace.clone();
        match (current.as_deref(), key.namespace()) {
            (None, ns) | (Some(""), ns) => meta.namespace = ns.map(str::to_string),
            (Some(a), Some(b)) if a == b => {}
            (Some(_), None) => {
                return Err(RegistryError::NamespaceNotAllowed {
                    resource: self.identity.to_string(),
                })
            }
            (Some(a), Some(b)) => {
                return Err(RegistryError::invalid(format!(
                    "metadata.namespace {a:?} does not match {b:?}"
                )))
            }
        }
        Ok(())
    }
}

fn stamp_new<R: Resource>(object: &mut R) {
    let meta = object.metadata_mut();
    if meta.uid.is_none() {
        meta.uid = Some(Uuid::new_v4());
    }
    if meta.creation_timestamp.is_none() {
        meta.creation_timestamp = Some(Utc::now());
    }
}
