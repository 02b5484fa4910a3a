//! Per-request options for the REST client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Method;
use crate::config::DEFAULT_CACHE_MINUTES;

// == Request Options ==
/// What to send: method and optional JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self::with_body(Method::Post, body)
    }

    pub fn put(body: Value) -> Self {
        Self::with_body(Method::Put, body)
    }

    pub fn patch(body: Value) -> Self {
        Self::with_body(Method::Patch, body)
    }

    pub fn delete() -> Self {
        Self {
            method: Method::Delete,
            body: None,
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
        }
    }
}

// == Cache Options ==
/// How the request interacts with the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Serve and store through the cache; honoured only for GET
    #[serde(default)]
    pub use_cache: bool,
    /// TTL in minutes for a stored response
    #[serde(default = "default_cache_time")]
    pub cache_time: u64,
    /// Drop this request's own key before executing
    #[serde(default)]
    pub invalidate_cache: bool,
}

fn default_cache_time() -> u64 {
    DEFAULT_CACHE_MINUTES
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            use_cache: false,
            cache_time: DEFAULT_CACHE_MINUTES,
            invalidate_cache: false,
        }
    }
}

impl CacheOptions {
    /// Cache the response for `minutes`.
    pub fn cached(minutes: u64) -> Self {
        Self {
            use_cache: true,
            cache_time: minutes,
            invalidate_cache: false,
        }
    }

    /// Drop the cached copy first, then cache the fresh response.
    pub fn refresh(minutes: u64) -> Self {
        Self {
            invalidate_cache: true,
            ..Self::cached(minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request = RequestOptions::default();
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());

        let cache = CacheOptions::default();
        assert!(!cache.use_cache);
        assert_eq!(cache.cache_time, 30);
        assert!(!cache.invalidate_cache);
    }

    #[test]
    fn test_cache_options_deserialize_defaults() {
        let cache: CacheOptions = serde_json::from_str(r#"{"use_cache": true}"#).unwrap();
        assert!(cache.use_cache);
        assert_eq!(cache.cache_time, 30);
    }

    #[test]
    fn test_request_options_deserialize() {
        let request: RequestOptions =
            serde_json::from_str(r#"{"method": "POST", "body": {"name": "Asha"}}"#).unwrap();
        assert_eq!(request, RequestOptions::post(json!({"name": "Asha"})));
    }

    #[test]
    fn test_refresh_sets_both_flags() {
        let cache = CacheOptions::refresh(5);
        assert!(cache.use_cache);
        assert!(cache.invalidate_cache);
        assert_eq!(cache.cache_time, 5);
    }
}
