use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a resource type: API group, kind, and scope.
///
/// Supplied by the type system once per kind and never changed afterwards.
/// Together with a [`ResourceKey`] it fully determines where an instance
/// lives in the bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    /// API group, e.g. `cloud.jsonblob.dev`.
    pub group: String,
    /// Kind in its canonical CamelCase form, e.g. `Machine`.
    pub kind: String,
    /// Whether instances live inside a namespace.
    pub namespaced: bool,
}

impl ResourceIdentity {
    /// Identity for a namespaced kind.
    pub fn namespaced(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            namespaced: true,
        }
    }

    /// Identity for a cluster-scoped kind.
    pub fn cluster_scoped(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            namespaced: false,
        }
    }

    /// Resource name used in storage paths and URLs.
    ///
    /// Lowercased kind with a plain `s` appended. Irregular plurals are not
    /// handled: `Policy` becomes `policys`.
    pub fn plural(&self) -> String {
        format!("{}s", self.kind.to_lowercase())
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plural(), self.group)
    }
}

/// Address of one resource instance within its kind.
///
/// `namespace` must be present exactly when the kind is namespaced; the
/// registry enforces this when resolving paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceKey {
    /// Key for a cluster-scoped instance.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Key for a namespaced instance.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Namespace as a borrowed `&str`, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
