use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// CORS is wide open: any origin, method and header.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/perguntar", post(handlers::perguntar))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
