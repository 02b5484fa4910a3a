//! API Routes
//!
//! Configures the Axum router for the caching gateway.

use axum::{
    routing::{any, delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_key_handler, health_handler, invalidate_prefix_handler, invalidate_resource_handler,
    proxy_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `ANY /api/*path` - Forward to the storefront API through the cache
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/invalidate` - Drop keys by raw prefix
/// - `POST /cache/invalidate/:resource` - Drop a resource family's reads
/// - `DELETE /cache/keys/*key` - Drop one key
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (the storefront is served from another host)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/*path", any(proxy_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_prefix_handler))
        .route("/cache/invalidate/:resource", post(invalidate_resource_handler))
        .route("/cache/keys/*key", delete(delete_key_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
