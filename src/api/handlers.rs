//! API Handlers
//!
//! HTTP request handlers for the caching gateway: the storefront proxy and
//! the cache administration endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Uri},
    Json,
};
use serde_json::Value;

use crate::cache::{key::read_prefix, Method};
use crate::client::{ApiClient, CacheOptions, RequestOptions};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    DeleteResponse, HealthResponse, InvalidatePrefixRequest, InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached REST client for the upstream storefront API
    pub client: ApiClient,
    /// Whether proxied GETs read through the cache
    pub cache_reads: bool,
    /// TTL in minutes for proxied reads
    pub cache_minutes: u64,
}

impl AppState {
    pub fn new(client: ApiClient, cache_reads: bool, cache_minutes: u64) -> Self {
        Self {
            client,
            cache_reads,
            cache_minutes,
        }
    }

    /// Creates a new AppState from configuration on top of an existing client.
    pub fn from_config(config: &Config, client: ApiClient) -> Self {
        Self::new(
            client,
            config.gateway_cache_reads,
            config.default_cache_minutes,
        )
    }
}

/// Handler for any method on /api/*path
///
/// Forwards the request upstream through the cached client. A
/// `Cache-Control: no-cache` header drops the cached copy before reading.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: axum::http::Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let method: Method = method.as_str().parse()?;
    let endpoint = upstream_endpoint(&uri);

    let body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(
            serde_json::from_slice::<Value>(&body)
                .map_err(|e| ApiError::InvalidRequest(format!("Body is not valid JSON: {e}")))?,
        )
    };

    let options = RequestOptions { method, body };
    let cache = CacheOptions {
        use_cache: state.cache_reads,
        cache_time: state.cache_minutes,
        invalidate_cache: wants_fresh(&headers),
    };

    let value = state.client.request(&endpoint, options, cache).await?;
    Ok(Json(value))
}

/// Endpoint relative to the API root, still percent-encoded as received.
fn upstream_endpoint(uri: &Uri) -> String {
    let path = uri.path();
    let path = path.strip_prefix("/api").unwrap_or(path);
    let path = if path.is_empty() { "/" } else { path };

    match uri.query() {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

fn wants_fresh(headers: &HeaderMap) -> bool {
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("no-cache"))
        .unwrap_or(false)
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.client.store().read().await.stats();
    Json(StatsResponse::new(&stats, state.client.in_flight_count().await))
}

/// Handler for POST /cache/invalidate
///
/// Drops every cached key starting with the given raw prefix.
pub async fn invalidate_prefix_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidatePrefixRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state.client.invalidator().invalidate_prefix(&req.prefix).await;
    Ok(Json(InvalidateResponse::new(req.prefix, removed)))
}

/// Handler for POST /cache/invalidate/:resource
///
/// Same purge a write to the resource triggers.
pub async fn invalidate_resource_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.client.invalidator().invalidate_resource(&resource).await;
    Json(InvalidateResponse::new(read_prefix(&resource), removed))
}

/// Handler for DELETE /cache/keys/*key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.client.invalidator().invalidate_key(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(ApiError::NotFound(key))
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.client.base_url()))
}
