use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all jsonblob endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handler::health_handler))
        .route(
            "/apis/:group/v1/machines",
            get(handler::list_machines)
                .post(handler::create_machine)
                .delete(handler::delete_machines),
        )
        .route(
            "/apis/:group/v1/machines/:name",
            get(handler::get_machine)
                .put(handler::put_machine)
                .delete(handler::delete_machine),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
