//! API Module
//!
//! HTTP handlers and routing for the caching gateway.
//!
//! # Endpoints
//! - `ANY /api/*path` - Storefront API through the cache
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/invalidate` - Drop keys by raw prefix
//! - `POST /cache/invalidate/:resource` - Drop a resource family's reads
//! - `DELETE /cache/keys/*key` - Drop one key
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
