//! Read-Through Fetcher Module
//!
//! Serves reads from the store and, on a miss, runs the underlying fetch once
//! per key no matter how many callers ask for it concurrently.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::{ApiError, Result};

/// A fetch shared by every caller waiting on the same key.
type SharedFetch<V> = Shared<BoxFuture<'static, Result<V>>>;

// == Read Through ==
/// Read-through front for a shared `CacheStore`.
///
/// Lock order is in-flight map, then store. The fetch itself runs with no lock
/// held, on its own task, so it completes even if every caller goes away and
/// it may call back into the cache freely.
///
/// A fetched value is stored only if nothing invalidated its key while the
/// fetch was running.
pub struct ReadThrough<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    in_flight: Arc<Mutex<HashMap<String, SharedFetch<V>>>>,
}

impl<V> Clone for ReadThrough<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<V> ReadThrough<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<RwLock<CacheStore<V>>>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The store this fetcher reads through.
    pub fn store(&self) -> &Arc<RwLock<CacheStore<V>>> {
        &self.store
    }

    /// Number of fetches currently running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    // == Get Or Fetch ==
    /// Returns the fresh cached value for `key`, or runs `fetch` to get it.
    ///
    /// Concurrent callers for an uncached key share one `fetch`; all of them
    /// receive its value or its error. Successful values are stored for
    /// `ttl_minutes`; errors are never stored.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F, ttl_minutes: u64) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        // Fast path: a fresh hit needs neither the in-flight map nor the write lock
        if let Some(value) = self.store.read().await.get_fresh(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        let shared = {
            let mut in_flight = self.in_flight.lock().await;

            if let Some(value) = self.store.write().await.get(key) {
                debug!(key, "cache hit");
                return Ok(value);
            }

            match in_flight.get(key) {
                Some(running) => {
                    debug!(key, "joining in-flight fetch");
                    self.store.write().await.stats_mut().record_coalesced();
                    running.clone()
                }
                None => {
                    debug!(key, "cache miss, fetching");
                    {
                        let mut store = self.store.write().await;
                        store.stats_mut().record_fetch();
                        store.claim(key);
                    }
                    let shared = self.spawn_fetch(key.to_string(), fetch(), ttl_minutes);
                    in_flight.insert(key.to_string(), shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// Runs `fut` on its own task, stores a success, then clears the marker.
    ///
    /// The marker cannot be cleared before the caller registers it: clearing
    /// needs the in-flight lock, which the caller holds until registration.
    /// A panicking fetch settles as an `Internal` error so the marker is
    /// still cleared.
    fn spawn_fetch<Fut>(&self, key: String, fut: Fut, ttl_minutes: u64) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Internal(format!("fetch for {key} panicked"))),
            };

            {
                let mut store = store.write().await;
                let claimed = store.release_claim(&key);
                match &result {
                    Ok(value) if claimed => store.set(key.clone(), value.clone(), ttl_minutes),
                    Ok(_) => {
                        debug!(key = %key, "invalidated while fetching, result not stored");
                    }
                    Err(e) => {
                        store.stats_mut().record_failed_fetch();
                        warn!(key = %key, error = %e, "fetch failed, nothing cached");
                    }
                }
            }

            in_flight.lock().await.remove(&key);
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(ApiError::Internal(format!("fetch task failed: {e}"))),
            }
        }
        .boxed()
        .shared()
    }

    // == Invalidate ==
    /// Drops a single cached key. Returns whether it existed.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }
}
