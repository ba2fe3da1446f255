use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use jsonblob_registry::{ListFilter, Repository};
use jsonblob_store::ObjectStore;
use jsonblob_types::{Machine, MachineList, ResourceKey, CLOUD_GROUP};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ServerError, ServerResult};

/// Repository serving the Machine kind.
pub type MachineRepository = Repository<Machine, Arc<dyn ObjectStore>>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub machines: Arc<MachineRepository>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "labelSelector")]
    pub label_selector: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> ServerResult<ListFilter> {
        match &self.label_selector {
            Some(selector) => Ok(ListFilter::parse(selector)?),
            None => Ok(ListFilter::everything()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    #[serde(default)]
    pub upsert: bool,
}

fn check_group(group: &str) -> ServerResult<()> {
    if group == CLOUD_GROUP {
        Ok(())
    } else {
        Err(ServerError::UnknownGroup(group.to_string()))
    }
}

/// Run a repository call on the blocking pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_machines(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<MachineList>> {
    check_group(&group)?;
    let filter = query.filter()?;
    let list = blocking(move || Ok(state.machines.list(None, &filter)?)).await?;
    Ok(Json(list))
}

pub async fn create_machine(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(machine): Json<Machine>,
) -> ServerResult<(StatusCode, Json<Machine>)> {
    check_group(&group)?;
    if machine.metadata.name.is_empty() {
        return Err(ServerError::BadRequest("metadata.name is required".into()));
    }
    let key = ResourceKey::cluster(machine.metadata.name.clone());
    let created = blocking(move || Ok(state.machines.create(&key, machine)?)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_machines(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<MachineList>> {
    check_group(&group)?;
    let filter = query.filter()?;
    let removed = blocking(move || Ok(state.machines.delete_collection(None, &filter)?)).await?;
    Ok(Json(removed))
}

pub async fn get_machine(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
) -> ServerResult<Json<Machine>> {
    check_group(&group)?;
    let key = ResourceKey::cluster(name);
    let machine = blocking(move || Ok(state.machines.get(&key)?)).await?;
    Ok(Json(machine))
}

/// Replace a machine. With `?upsert=true` an absent machine is created.
pub async fn put_machine(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
    Query(query): Query<UpdateQuery>,
    Json(machine): Json<Machine>,
) -> ServerResult<(StatusCode, Json<Machine>)> {
    check_group(&group)?;
    let key = ResourceKey::cluster(name);
    let outcome = blocking(move || {
        Ok(state
            .machines
            .update(&key, query.upsert, move |_| Ok(machine))?)
    })
    .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.object)))
}

pub async fn delete_machine(
    State(state): State<AppState>,
    Path((group, name)): Path<(String, String)>,
) -> ServerResult<Json<Machine>> {
    check_group(&group)?;
    let key = ResourceKey::cluster(name);
    let machine = blocking(move || Ok(state.machines.delete(&key)?)).await?;
    Ok(Json(machine))
}
