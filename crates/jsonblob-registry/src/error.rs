use jsonblob_store::StoreError;
use jsonblob_types::TypeError;
use jsonblob_watch::WatchError;

/// Errors produced by registry operations.
///
/// Every variant carries enough context (resource, key or blob path) to be
/// logged or mapped to a protocol status without further lookups.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The target object does not exist.
    #[error("{resource} \"{key}\" not found")]
    NotFound { resource: String, key: String },

    /// Create found an object already stored at the key.
    #[error("{resource} \"{key}\" already exists")]
    AlreadyExists { resource: String, key: String },

    /// A namespaced kind was addressed without a namespace.
    #[error("{resource} is namespaced, a namespace is required")]
    NamespaceRequired { resource: String },

    /// A cluster-scoped kind was addressed with a namespace.
    #[error("{resource} is cluster-scoped, a namespace is not allowed")]
    NamespaceNotAllowed { resource: String },

    /// A stored blob could not be decoded. Not retried.
    #[error("corrupt object at {path}: {reason}")]
    CorruptState { path: String, reason: String },

    /// The object store failed. No retry is attempted at this layer.
    #[error("object store unavailable during {op} of {path}: {source}")]
    BackendUnavailable {
        op: &'static str,
        path: String,
        #[source]
        source: StoreError,
    },

    /// A watch subscriber fell behind and lost events. The stream continues.
    #[error("watch {subscription} dropped {skipped} events")]
    OverflowDropped { subscription: u64, skipped: u64 },

    /// The request was rejected before any write.
    #[error("invalid: {reason}")]
    Invalid { reason: String },

    #[error("watch error: {0}")]
    Watch(WatchError),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub(crate) fn backend(op: &'static str, path: &str, source: StoreError) -> Self {
        Self::BackendUnavailable {
            op,
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

impl From<TypeError> for RegistryError {
    fn from(err: TypeError) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<WatchError> for RegistryError {
    fn from(err: WatchError) -> Self {
        match err {
            WatchError::Overflow {
                subscription,
                skipped,
            } => Self::OverflowDropped {
                subscription,
                skipped,
            },
            other => Self::Watch(other),
        }
    }
}

/// Convenience alias used throughout the registry crate.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_maps_to_overflow_dropped() {
        let err: RegistryError = WatchError::Overflow {
            subscription: 3,
            skipped: 9,
        }
        .into();
        assert!(matches!(
            err,
            RegistryError::OverflowDropped {
                subscription: 3,
                skipped: 9
            }
        ));

        let err: RegistryError = WatchError::Closed.into();
        assert!(matches!(err, RegistryError::Watch(WatchError::Closed)));
    }

    #[test]
    fn messages_carry_context() {
        let err = RegistryError::NotFound {
            resource: "nodes.infra".into(),
            key: "prod/node-1".into(),
        };
        assert_eq!(err.to_string(), "nodes.infra \"prod/node-1\" not found");
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());

        let err = RegistryError::backend("get", "a/b.json", StoreError::Backend("down".into()));
        assert!(err.to_string().contains("get of a/b.json"));
    }
}
