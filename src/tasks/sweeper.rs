//! Stale Sweep Task
//!
//! Reads already evict stale entries they touch; the sweep reclaims entries
//! for keys nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that purges stale entries every `interval_secs` seconds.
///
/// The write lock is held only for the purge itself. Abort the returned
/// handle to stop the task.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<serde_json::Value>::new()));
/// let sweeper = spawn_sweeper(store.clone(), 60);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper<V>(store: Arc<RwLock<CacheStore<V>>>, interval_secs: u64) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stale sweep task with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = store.write().await.purge_stale();

            if removed > 0 {
                info!("Stale sweep: removed {} expired entries", removed);
            } else {
                debug!("Stale sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::{json, Value};

    fn manual_store() -> (Arc<RwLock<CacheStore<Value>>>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = CacheStore::new().with_clock(Arc::new(clock.clone()));
        (Arc::new(RwLock::new(store)), clock)
    }

    #[tokio::test]
    async fn test_sweeper_removes_stale_entries() {
        let (store, clock) = manual_store();
        store.write().await.set("GET_/banners", json!([]), 1);
        store.write().await.set("GET_/products", json!([]), 60);

        let handle = spawn_sweeper(store.clone(), 1);
        clock.advance(Duration::from_secs(61));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let guard = store.read().await;
            assert!(guard.entry("GET_/banners").is_none());
            assert!(guard.entry("GET_/products").is_some());
            assert_eq!(guard.stats().expired, 1);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let (store, _) = manual_store();

        let handle = spawn_sweeper(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
