//! REST client for the storefront API.
//!
//! Every request goes through here: cached GETs are served by the read-through
//! fetcher, writes purge the cached reads of the resource they touched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{
    generate_cache_key, CacheStore, InvalidationPolicy, Invalidator, Method, ReadThrough,
};
use crate::client::{Anonymous, CacheOptions, RequestOptions, SessionToken, TokenProvider};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Shared response cache as the client sees it.
pub type SharedStore = Arc<RwLock<CacheStore<Value>>>;

// == Api Client ==
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    reads: ReadThrough<Value>,
    invalidator: Invalidator<Value>,
}

impl ApiClient {
    // == Constructor ==
    /// Creates a client for `base_url` on top of `store`, anonymous, with the
    /// default invalidation policy and no request timeout.
    pub fn new(base_url: impl Into<String>, store: SharedStore) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, store)
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &Config, store: SharedStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to build HTTP client: {e}")))?;

        let mut client = Self::with_http(http, config.upstream_base_url.clone(), store)
            .with_invalidation_policy(config.invalidation_policy);
        if let Some(token) = &config.api_token {
            client = client.with_token_provider(SessionToken::new(Some(token.clone())));
        }
        Ok(client)
    }

    fn with_http(http: reqwest::Client, base_url: impl Into<String>, store: SharedStore) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Arc::new(Anonymous),
            reads: ReadThrough::new(Arc::clone(&store)),
            invalidator: Invalidator::new(store, InvalidationPolicy::default()),
        }
    }

    pub fn with_token_provider(mut self, tokens: impl TokenProvider + 'static) -> Self {
        self.tokens = Arc::new(tokens);
        self
    }

    pub fn with_invalidation_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidator = Invalidator::new(Arc::clone(self.reads.store()), policy);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &SharedStore {
        self.reads.store()
    }

    pub fn invalidator(&self) -> &Invalidator<Value> {
        &self.invalidator
    }

    /// Number of cached reads currently being fetched upstream.
    pub async fn in_flight_count(&self) -> usize {
        self.reads.in_flight_count().await
    }

    // == Request ==
    /// Sends a request to `endpoint` (relative to the API root).
    ///
    /// * GET with `use_cache` reads through the cache for `cache_time` minutes.
    /// * `invalidate_cache` drops this request's key before anything else.
    /// * Any non-GET purges the cached reads of the endpoint's resource once
    ///   the write has settled, subject to the invalidation policy.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
        cache: CacheOptions,
    ) -> Result<Value> {
        let method = options.method;
        let key = generate_cache_key(endpoint, method, options.body.as_ref());

        if cache.invalidate_cache {
            self.reads.invalidate(&key).await;
        }

        if method.is_read() && cache.use_cache {
            return self
                .reads
                .get_or_fetch(&key, || self.dispatch(method, endpoint, None), cache.cache_time)
                .await;
        }

        let result = self.dispatch(method, endpoint, options.body).await;

        if !method.is_read() {
            self.invalidator.after_write(endpoint, result.is_ok()).await;
        }

        result
    }

    /// Like [`request`](Self::request), decoding the payload into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        cache: CacheOptions,
    ) -> Result<T> {
        let value = self.request(endpoint, options, cache).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Typed GET through the cache.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cache_minutes: u64,
    ) -> Result<T> {
        self.request_json(
            endpoint,
            RequestOptions::get(),
            CacheOptions::cached(cache_minutes),
        )
        .await
    }

    pub async fn get(&self, endpoint: &str, cache: CacheOptions) -> Result<Value> {
        self.request(endpoint, RequestOptions::get(), cache).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(endpoint, RequestOptions::post(body), CacheOptions::default())
            .await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(endpoint, RequestOptions::put(body), CacheOptions::default())
            .await
    }

    pub async fn patch(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(endpoint, RequestOptions::patch(body), CacheOptions::default())
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(endpoint, RequestOptions::delete(), CacheOptions::default())
            .await
    }

    // == Dispatch ==
    /// Builds the upstream request now and returns a future that owns it.
    fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value>> + Send + 'static {
        let url = self.url_for(endpoint);
        debug!(%method, %url, "dispatching request");

        let mut builder = self.http.request(reqwest_method(method), url);
        if let Some(token) = self.tokens.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        async move {
            let response = builder.send().await?;
            read_response(response).await
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Turns an upstream response into a JSON payload or an `Http` error carrying
/// the server's `message`.
async fn read_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(RwLock::new(CacheStore::new())))
    }

    #[test]
    fn test_url_joining() {
        let client = client("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.url_for("/products?page=2"),
            "http://localhost:5000/api/products?page=2"
        );
        assert_eq!(client.url_for("services"), "http://localhost:5000/api/services");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(reqwest_method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error_and_not_cached() {
        // Grab a free port, then close it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client(&format!("http://{addr}"));

        let result = client.get("/products", CacheOptions::cached(30)).await;

        assert!(matches!(result, Err(ApiError::Network(_))));
        assert!(client.store().read().await.is_empty());
    }

    #[test]
    fn test_from_config_applies_policy() {
        let config = Config {
            invalidation_policy: InvalidationPolicy::OnSuccess,
            api_token: Some("secret".to_string()),
            ..Config::default()
        };
        let client =
            ApiClient::from_config(&config, Arc::new(RwLock::new(CacheStore::new()))).unwrap();

        assert_eq!(client.invalidator().policy(), InvalidationPolicy::OnSuccess);
        assert_eq!(client.tokens.bearer_token(), Some("secret".to_string()));
    }
}
