//! Invalidator Module
//!
//! Purges cached reads of a resource family after a write to that family.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::key::{read_prefix, resource_of};
use crate::cache::CacheStore;
use crate::error::ApiError;

// == Invalidation Policy ==
/// When a write purges cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidationPolicy {
    /// After every write, whatever its outcome
    #[default]
    Always,
    /// Only after writes the server accepted
    OnSuccess,
}

impl InvalidationPolicy {
    /// Whether a write that ended with `succeeded` should purge reads.
    pub fn applies(&self, succeeded: bool) -> bool {
        match self {
            InvalidationPolicy::Always => true,
            InvalidationPolicy::OnSuccess => succeeded,
        }
    }
}

impl fmt::Display for InvalidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationPolicy::Always => f.write_str("always"),
            InvalidationPolicy::OnSuccess => f.write_str("on-success"),
        }
    }
}

impl FromStr for InvalidationPolicy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(InvalidationPolicy::Always),
            "on-success" | "on_success" | "onsuccess" => Ok(InvalidationPolicy::OnSuccess),
            other => Err(ApiError::InvalidRequest(format!(
                "Unknown invalidation policy: {other}"
            ))),
        }
    }
}

// == Invalidator ==
/// Write-side companion of the read-through fetcher.
pub struct Invalidator<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    policy: InvalidationPolicy,
}

impl<V> Clone for Invalidator<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<V> Invalidator<V> {
    pub fn new(store: Arc<RwLock<CacheStore<V>>>, policy: InvalidationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    // == After Write ==
    /// Called once a write to `endpoint` has settled.
    ///
    /// Returns the number of cached reads dropped. Endpoints without a first
    /// path segment drop nothing.
    pub async fn after_write(&self, endpoint: &str, succeeded: bool) -> usize {
        if !self.policy.applies(succeeded) {
            debug!(endpoint, "write failed, cached reads kept");
            return 0;
        }

        match resource_of(endpoint) {
            Some(resource) => self.invalidate_resource(resource).await,
            None => 0,
        }
    }

    // == Invalidate Resource ==
    /// Drops every cached read whose key starts with `GET_/{resource}`.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let prefix = read_prefix(resource);
        let removed = self.store.write().await.invalidate_by_prefix(&prefix);
        if removed > 0 {
            info!("Invalidated {} cached reads under {}", removed, prefix);
        }
        removed
    }

    /// Drops one key. Returns whether it existed.
    pub async fn invalidate_key(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }

    /// Drops every key starting with a raw `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.store.write().await.invalidate_by_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn seeded(policy: InvalidationPolicy) -> Invalidator<Value> {
        let store = Arc::new(RwLock::new(CacheStore::new()));
        {
            let mut guard = store.write().await;
            guard.set("GET_/products", json!([]), 30);
            guard.set("GET_/products/9", json!({}), 30);
            guard.set("GET_/products?brand=samsung", json!([]), 30);
            guard.set("GET_/categories", json!([]), 30);
        }
        Invalidator::new(store, policy)
    }

    #[tokio::test]
    async fn test_write_purges_resource_family() {
        let invalidator = seeded(InvalidationPolicy::Always).await;

        let removed = invalidator.after_write("/products/123", true).await;

        assert_eq!(removed, 3);
        let mut store = invalidator.store.write().await;
        assert_eq!(store.get("GET_/products"), None);
        assert_eq!(store.get("GET_/categories"), Some(json!([])));
    }

    #[tokio::test]
    async fn test_always_policy_purges_after_failed_write() {
        let invalidator = seeded(InvalidationPolicy::Always).await;
        assert_eq!(invalidator.after_write("/products", false).await, 3);
    }

    #[tokio::test]
    async fn test_on_success_policy_keeps_reads_after_failed_write() {
        let invalidator = seeded(InvalidationPolicy::OnSuccess).await;

        assert_eq!(invalidator.after_write("/products", false).await, 0);
        assert_eq!(invalidator.after_write("/products", true).await, 3);
    }

    #[tokio::test]
    async fn test_root_endpoint_purges_nothing() {
        let invalidator = seeded(InvalidationPolicy::Always).await;
        assert_eq!(invalidator.after_write("/", true).await, 0);
        assert_eq!(invalidator.store.read().await.len(), 4);
    }

    #[tokio::test]
    async fn test_invalidate_key() {
        let invalidator = seeded(InvalidationPolicy::Always).await;

        assert!(invalidator.invalidate_key("GET_/categories").await);
        assert!(!invalidator.invalidate_key("GET_/categories").await);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "on-success".parse::<InvalidationPolicy>().unwrap(),
            InvalidationPolicy::OnSuccess
        );
        assert_eq!(
            "ALWAYS".parse::<InvalidationPolicy>().unwrap(),
            InvalidationPolicy::Always
        );
        assert!("sometimes".parse::<InvalidationPolicy>().is_err());
        assert_eq!(InvalidationPolicy::OnSuccess.to_string(), "on-success");
    }
}
