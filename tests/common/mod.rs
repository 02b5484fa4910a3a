//! In-process stand-in for the storefront API.
//!
//! Counts how often each route is hit so tests can tell cached reads from
//! upstream reads.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use storefront_cache::{ApiClient, CacheStore};

pub const TOKEN: &str = "admin-session-token";

#[derive(Default)]
pub struct Hits {
    pub products: AtomicUsize,
    pub product_writes: AtomicUsize,
    pub categories: AtomicUsize,
    pub slow: AtomicUsize,
    pub flaky: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct Upstream {
    pub base_url: String,
    pub hits: Arc<Hits>,
}

/// Starts the fake API on an ephemeral port.
pub async fn start_upstream() -> Upstream {
    let hits = Arc::new(Hits::default());

    let app = Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/:id", get(get_product).delete(delete_product))
        .route("/api/categories", get(list_categories))
        .route("/api/slow", get(slow))
        .route("/api/flaky", get(flaky))
        .route("/api/secure", get(secure))
        .route("/api/broken", get(broken))
        .route("/api/missing", get(missing))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Upstream {
        base_url: format!("http://{addr}/api"),
        hits,
    }
}

/// Cached client for `upstream` over a fresh store.
pub fn client_for(upstream: &Upstream) -> ApiClient {
    ApiClient::new(
        upstream.base_url.clone(),
        Arc::new(RwLock::new(CacheStore::new())),
    )
}

async fn list_products(
    State(hits): State<Arc<Hits>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    hits.products.fetch_add(1, Ordering::SeqCst);
    match params.get("category") {
        Some(category) => Json(json!([{ "id": 7, "category": category }])),
        None => Json(json!([{ "id": 1, "name": "Redmi Note 13" }])),
    }
}

async fn create_product(State(hits): State<Arc<Hits>>, Json(body): Json<Value>) -> Response {
    hits.product_writes.fetch_add(1, Ordering::SeqCst);
    if body.get("name").and_then(Value::as_str).unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Product name is required" })),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({ "id": 2, "name": body["name"] }))).into_response()
}

async fn get_product(State(hits): State<Arc<Hits>>, Path(id): Path<String>) -> Json<Value> {
    hits.products.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "id": id }))
}

async fn delete_product(State(hits): State<Arc<Hits>>) -> StatusCode {
    hits.product_writes.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn list_categories(State(hits): State<Arc<Hits>>) -> Json<Value> {
    hits.categories.fetch_add(1, Ordering::SeqCst);
    Json(json!(["phones", "accessories"]))
}

async fn slow(State(hits): State<Arc<Hits>>) -> Json<Value> {
    hits.slow.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(json!({ "banner": "Diwali sale" }))
}

/// Fails on the first call, succeeds afterwards.
async fn flaky(State(hits): State<Arc<Hits>>) -> Response {
    let n = hits.flaky.fetch_add(1, Ordering::SeqCst);
    if n == 0 {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Database warming up" })),
        )
            .into_response()
    } else {
        Json(json!({ "ok": true })).into_response()
    }
}

async fn secure(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({ "role": "admin" })).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authorized, token failed" })),
        )
            .into_response(),
    }
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response()
}

async fn missing() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Service not found" })),
    )
        .into_response()
}
