//! HTTP server for jsonblob.
//!
//! Exposes the registry for the built-in `Machine` kind as a small REST API:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | `GET` | `/healthz` | liveness |
//! | `GET` | `/apis/{group}/v1/machines` | list (`?labelSelector=`) |
//! | `POST` | `/apis/{group}/v1/machines` | create |
//! | `DELETE` | `/apis/{group}/v1/machines` | delete collection |
//! | `GET` | `/apis/{group}/v1/machines/{name}` | get |
//! | `PUT` | `/apis/{group}/v1/machines/{name}` | update (`?upsert=true`) |
//! | `DELETE` | `/apis/{group}/v1/machines/{name}` | delete |
//!
//! Watches are served in-process through [`JsonBlobServer::machines`].

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ErrorBody, ServerError, ServerResult};
pub use handler::{AppState, MachineRepository};
pub use server::JsonBlobServer;

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use jsonblob_types::{Machine, MachineList, MachineSpec};
    use tower::util::ServiceExt;

    use super::*;

    const MACHINES: &str = "/apis/cloud.jsonblob.dev/v1/machines";

    fn app() -> Router {
        JsonBlobServer::new(ServerConfig::default()).unwrap().router()
    }

    fn json_request(method: Method, uri: &str, body: &Machine) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = send(&app(), empty_request(Method::GET, "/healthz")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_get_list_delete() {
        let app = app();
        let machine = Machine::new("m1").with_spec(MachineSpec {
            cpus: 2,
            ..Default::default()
        });

        let response = send(&app, json_request(Method::POST, MACHINES, &machine)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Machine = body_json(response).await;
        assert!(created.metadata.uid.is_some());

        let response = send(&app, empty_request(Method::GET, &format!("{MACHINES}/m1"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: Machine = body_json(response).await;
        assert_eq!(fetched, created);

        let response = send(&app, empty_request(Method::GET, MACHINES)).await;
        let list: MachineList = body_json(response).await;
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.type_meta.kind, "MachineList");

        let response = send(&app, empty_request(Method::DELETE, &format!("{MACHINES}/m1"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, empty_request(Method::GET, &format!("{MACHINES}/m1"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = body_json(response).await;
        assert_eq!(body.error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let app = app();
        let machine = Machine::new("dup");
        let first = send(&app, json_request(Method::POST, MACHINES, &machine)).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = send(&app, json_request(Method::POST, MACHINES, &machine)).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn put_requires_upsert_for_absent_machines() {
        let app = app();
        let machine = Machine::new("m2");
        let uri = format!("{MACHINES}/m2");

        let response = send(&app, json_request(Method::PUT, &uri, &machine)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let upsert = format!("{uri}?upsert=true");
        let response = send(&app, json_request(Method::PUT, &upsert, &machine)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, json_request(Method::PUT, &uri, &machine)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn collection_delete_honours_label_selector() {
        let app = app();
        for (name, pool) in [("a", "x"), ("b", "x"), ("c", "y")] {
            let mut machine = Machine::new(name);
            machine.metadata = machine.metadata.with_label("pool", pool);
            let response = send(&app, json_request(Method::POST, MACHINES, &machine)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(
            &app,
            empty_request(Method::DELETE, &format!("{MACHINES}?labelSelector=pool%3Dx")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let removed: MachineList = body_json(response).await;
        assert_eq!(removed.items.len(), 2);

        let response = send(&app, empty_request(Method::GET, MACHINES)).await;
        let list: MachineList = body_json(response).await;
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].metadata.name, "c");
    }

    #[tokio::test]
    async fn invalid_names_are_unprocessable() {
        let app = app();
        let bad = Machine::new("Bad_Name");
        let response = send(&app, json_request(Method::POST, MACHINES, &bad)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&app, json_request(Method::POST, MACHINES, &Machine::new(""))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let response = send(
            &app(),
            empty_request(Method::GET, "/apis/other.example.com/v1/machines"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
