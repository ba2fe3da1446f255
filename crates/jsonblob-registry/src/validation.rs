use std::fmt;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};

type CheckFn<R> = Arc<dyn Fn(&R) -> Result<(), String> + Send + Sync>;
type UpdateCheckFn<R> = Arc<dyn Fn(&R, &R) -> Result<(), String> + Send + Sync>;

/// Admission hooks run before a write.
///
/// A hook returns `Err(reason)` to reject the request; the repository then
/// reports [`RegistryError::Invalid`] without touching the store or emitting
/// an event. Missing hooks accept everything.
pub struct Validators<R> {
    create: Option<CheckFn<R>>,
    update: Option<UpdateCheckFn<R>>,
    delete: Option<CheckFn<R>>,
}

impl<R> Validators<R> {
    pub fn new() -> Self {
        Self {
            create: None,
            update: None,
            delete: None,
        }
    }

    /// Check objects about to be created, including upserts.
    pub fn on_create<F>(mut self, check: F) -> Self
    where
        F: Fn(&R) -> Result<(), String> + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(check));
        self
    }

    /// Check `(old, new)` before an existing object is replaced.
    pub fn on_update<F>(mut self, check: F) -> Self
    where
        F: Fn(&R, &R) -> Result<(), String> + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(check));
        self
    }

    /// Check an object before it is deleted, singly or in bulk.
    pub fn on_delete<F>(mut self, check: F) -> Self
    where
        F: Fn(&R) -> Result<(), String> + Send + Sync + 'static,
    {
        self.delete = Some(Arc::new(check));
        self
    }

    pub(crate) fn validate_create(&self, object: &R) -> RegistryResult<()> {
        match &self.create {
            Some(check) => check(object).map_err(RegistryError::invalid),
            None => Ok(()),
        }
    }

    pub(crate) fn validate_update(&self, old: &R, new: &R) -> RegistryResult<()> {
        match &self.update {
            Some(check) => check(old, new).map_err(RegistryError::invalid),
            None => Ok(()),
        }
    }

    pub(crate) fn validate_delete(&self, object: &R) -> RegistryResult<()> {
        match &self.delete {
            Some(check) => check(object).map_err(RegistryError::invalid),
            None => Ok(()),
        }
    }
}

impl<R> Default for Validators<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Validators<R> {
    fn clone(&self) -> Self {
        Self {
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
        }
    }
}

impl<R> fmt::Debug for Validators<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validators")
            .field("create", &self.create.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}
