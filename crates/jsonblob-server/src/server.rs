use std::sync::Arc;

use jsonblob_registry::{JsonCodec, Repository};
use jsonblob_watch::WatchHub;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{AppState, MachineRepository};
use crate::router::build_router;

/// jsonblob API server.
pub struct JsonBlobServer {
    config: ServerConfig,
    state: AppState,
}

impl JsonBlobServer {
    /// Open the configured storage and wire up the repositories.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = config.storage.build()?;
        let hub = WatchHub::new(config.watch.clone());
        let machines: MachineRepository = Repository::new(store, JsonCodec, hub);
        let state = AppState {
            machines: Arc::new(machines),
        };
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The machine repository, for in-process callers such as watchers.
    pub fn machines(&self) -> &Arc<MachineRepository> {
        &self.state.machines
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            storage = ?self.config.storage,
            "jsonblob server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
