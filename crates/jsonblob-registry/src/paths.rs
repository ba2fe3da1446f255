//! Blob path derivation.
//!
//! Layout, relative to the bucket root:
//!
//! ```text
//! {group}/{plural}/namespaces/{namespace}/{name}.json   namespaced kinds
//! {group}/{plural}/{name}.json                          cluster-scoped kinds
//! ```
//!
//! `plural` is the lowercased kind with `s` appended. Paths are a pure
//! function of identity, namespace and name; no I/O happens here.

use jsonblob_types::{validate_name, ResourceIdentity};

use crate::error::{RegistryError, RegistryResult};

/// Suffix of every stored object. Iteration ignores keys without it.
pub const JSON_SUFFIX: &str = ".json";

/// Directory holding every instance of `identity` in `namespace`.
///
/// An empty namespace counts as absent.
pub fn directory_for(
    identity: &ResourceIdentity,
    namespace: Option<&str>,
) -> RegistryResult<String> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    match (identity.namespaced, namespace) {
        (true, Some(ns)) => {
            validate_name(ns)?;
            Ok(format!(
                "{}/{}/namespaces/{}",
                identity.group,
                identity.plural(),
                ns
            ))
        }
        (true, None) => Err(RegistryError::NamespaceRequired {
            resource: identity.to_string(),
        }),
        (false, None) => Ok(format!("{}/{}", identity.group, identity.plural())),
        (false, Some(_)) => Err(RegistryError::NamespaceNotAllowed {
            resource: identity.to_string(),
        }),
    }
}

/// Full blob path of one instance, using the JSON suffix.
pub fn file_for(
    identity: &ResourceIdentity,
    namespace: Option<&str>,
    name: &str,
) -> RegistryResult<String> {
    file_with_suffix(identity, namespace, name, JSON_SUFFIX)
}

/// Full blob path of one instance with an explicit file suffix.
pub fn file_with_suffix(
    identity: &ResourceIdentity,
    namespace: Option<&str>,
    name: &str,
    suffix: &str,
) -> RegistryResult<String> {
    let dir = directory_for(identity, namespace)?;
    validate_name(name)?;
    Ok(format!("{dir}/{name}{suffix}"))
}
