//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth;
use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Everything here requires the API token.
    let protected = Router::new()
        .route(
            "/coverages",
            get(handlers::list_coverages).post(handlers::create_coverage),
        )
        .route("/coverages/gbg/{gbg}", get(handlers::get_coverage_by_gbg))
        .route(
            "/coverages/name/{short_name}",
            get(handlers::get_coverage_by_name),
        )
        .route("/coverages/{index}", delete(handlers::delete_coverage))
        .route("/database/recreate", post(handlers::recreate_database))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(handlers::openapi_json))
        .merge(protected)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
