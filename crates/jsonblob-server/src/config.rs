use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonblob_store::{FsObjectStore, InMemoryObjectStore, ObjectStore};
use jsonblob_watch::WatchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub watch: WatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            storage: StorageConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }
}

/// Which bucket backs the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Volatile, process-local bucket.
    #[default]
    Memory,
    /// A bucket rooted at a local directory.
    Filesystem { root: PathBuf },
}

impl StorageConfig {
    /// Open the configured object store.
    pub fn build(&self) -> ServerResult<Arc<dyn ObjectStore>> {
        match self {
            Self::Memory => Ok(Arc::new(InMemoryObjectStore::new())),
            Self::Filesystem { root } => Ok(Arc::new(FsObjectStore::open(root.clone())?)),
        }
    }
}
