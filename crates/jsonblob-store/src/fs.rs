use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::key::validate_key;
use crate::traits::ObjectStore;

/// Object store backed by a directory on the local filesystem.
///
/// Each key maps to a file below `root`, with `/` separators turned into
/// directories. Writes go to a temporary file in the target directory and
/// are renamed into place, so readers never observe a half-written object.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        debug!(root = %root.display(), "opened filesystem object store");
        Ok(Self { root })
    }

    /// The directory this store is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }

    fn resolve_dir(&self, dir: &str) -> StoreResult<PathBuf> {
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            return Ok(self.root.clone());
        }
        self.resolve(dir)
    }
}

fn io_error(key: &str, source: io::Error) -> StoreError {
    if source.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, key: &str) -> StoreResult<Bytes> {
        let path = self.resolve(key)?;
        if path.is_dir() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let data = std::fs::read(&path).map_err(|e| io_error(key, e))?;
        Ok(Bytes::from(data))
    }

    fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        let path = self.resolve(key)?;
        let parent = path.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(parent).map_err(|e| io_error(key, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| io_error(key, e))?;
        tmp.write_all(&data).map_err(|e| io_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(key, e))?;
        tmp.persist(&path).map_err(|e| io_error(key, e.error))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.resolve(key)?;
        if path.is_dir() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        std::fs::remove_file(&path).map_err(|e| io_error(key, e))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let path = self.resolve(key)?;
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn iter(&self, dir: &str, visit: &mut dyn FnMut(&str) -> StoreResult<()>) -> StoreResult<()> {
        let base = self.resolve_dir(dir)?;
        if !base.is_dir() {
            return Ok(());
        }
        let prefix = dir.trim_end_matches('/');

        for entry in WalkDir::new(&base).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io {
                key: prefix.to_string(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(leaf) = entry.file_name().to_str() else {
                continue;
            };
            // Skip in-flight temp files left by `put`.
            if leaf.starts_with(".tmp") {
                continue;
            }
            let key = if prefix.is_empty() {
                leaf.to_string()
            } else {
                format!("{prefix}/{leaf}")
            };
            visit(&key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path().join("bucket")).unwrap();
        (dir, store)
    }

    #[test]
    fn put_creates_nested_directories() {
        let (_dir, store) = temp_store();
        store
            .put("infra/nodes/namespaces/prod/node-1.json", Bytes::from_static(b"{}"))
            .unwrap();
        let on_disk = store
            .root()
            .join("infra")
            .join("nodes")
            .join("namespaces")
            .join("prod")
            .join("node-1.json");
        assert!(on_disk.is_file());
        assert_eq!(
            store.get("infra/nodes/namespaces/prod/node-1.json").unwrap().as_ref(),
            b"{}"
        );
    }

    #[test]
    fn get_and_delete_missing_are_not_found() {
        let (_dir, store) = temp_store();
        assert!(store.get("a/b.json").unwrap_err().is_not_found());
        assert!(store.delete("a/b.json").unwrap_err().is_not_found());
        assert!(!store.exists("a/b.json").unwrap());
    }

    #[test]
    fn overwrite_replaces_contents() {
        let (_dir, store) = temp_store();
        store.put("k.json", Bytes::from_static(b"old")).unwrap();
        store.put("k.json", Bytes::from_static(b"new")).unwrap();
        assert_eq!(store.get("k.json").unwrap().as_ref(), b"new");
    }

    #[test]
    fn iter_lists_direct_files_only() {
        let (_dir, store) = temp_store();
        for key in ["g/ms/a.json", "g/ms/b.json", "g/ms/nested/c.json", "g/other/d.json"] {
            store.put(key, Bytes::from_static(b"1")).unwrap();
        }
        let mut keys = store.list("g/ms").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["g/ms/a.json".to_string(), "g/ms/b.json".to_string()]);
    }

    #[test]
    fn iter_missing_dir_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list("does/not/exist").unwrap().is_empty());
    }

    #[test]
    fn directory_is_not_an_object() {
        let (_dir, store) = temp_store();
        store.put("g/ms/a.json", Bytes::from_static(b"1")).unwrap();
        assert!(!store.exists("g/ms").unwrap());
        assert!(store.get("g/ms").unwrap_err().is_not_found());
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.put("../outside.json", Bytes::new()),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.get("/etc/passwd"),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn reopen_sees_existing_objects() {
        let (dir, store) = temp_store();
        store.put("x/y.json", Bytes::from_static(b"persisted")).unwrap();
        drop(store);
        let reopened = FsObjectStore::open(dir.path().join("bucket")).unwrap();
        assert_eq!(reopened.get("x/y.json").unwrap().as_ref(), b"persisted");
    }
}
