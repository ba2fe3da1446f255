//! Object key helpers shared by the backends.

use crate::error::{StoreError, StoreResult};

/// Check that `key` is a relative, `/`-separated key with no empty,
/// `.` or `..` segments.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if key.starts_with('/') {
        return Err(invalid("key must be relative"));
    }
    if key.contains('\\') {
        return Err(invalid("key must use '/' as separator"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid("key must not contain empty segments")),
            "." | ".." => return Err(invalid("key must not contain '.' or '..' segments")),
            _ => {}
        }
    }
    Ok(())
}

/// Returns `true` if `key` is an object directly inside directory `dir`.
///
/// `dir` may be given with or without a trailing slash.
pub fn is_direct_child(dir: &str, key: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    match key.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(leaf) => !leaf.is_empty() && !leaf.contains('/'),
        None => false,
    }
}
