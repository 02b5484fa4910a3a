//! Cache Key Module
//!
//! Derives deterministic cache keys from an endpoint, an HTTP method and an
//! optional request body.
//!
//! Key layout: `{METHOD}_{path}[?{query}][#{body_len}:{body_prefix}]`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Number of leading body characters folded into a key.
pub const BODY_FINGERPRINT_CHARS: usize = 50;

// == Method ==
/// HTTP methods the REST client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Only GET responses may be cached; everything else is a write.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(ApiError::InvalidRequest(format!(
                "Unsupported method: {other}"
            ))),
        }
    }
}

// == Endpoint Parts ==
/// Splits an endpoint into its path (always starting with `/`) and query.
pub fn split_endpoint(endpoint: &str) -> (String, Option<&str>) {
    let without_fragment = endpoint.split('#').next().unwrap_or_default();
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
        None => (without_fragment, None),
    };

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    (path, query)
}

/// First path segment of an endpoint: `/products/123?x=1` -> `products`.
pub fn resource_of(endpoint: &str) -> Option<&str> {
    let path = endpoint.split(['?', '#']).next().unwrap_or_default();
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Key prefix shared by every cached read of a resource family.
pub fn read_prefix(resource: &str) -> String {
    format!("{}_/{}", Method::Get, resource.trim_matches('/'))
}

// == Generate Cache Key ==
/// Builds the cache key for a request.
///
/// Distinct query strings give distinct keys. Non-GET requests with a body get
/// a bounded fingerprint (byte length plus leading characters). A body that
/// cannot be serialized leaves the fingerprint off instead of failing.
pub fn generate_cache_key<B>(endpoint: &str, method: Method, body: Option<&B>) -> String
where
    B: Serialize + ?Sized,
{
    let (path, query) = split_endpoint(endpoint);
    let mut key = format!("{method}_{path}");

    if let Some(query) = query {
        key.push('?');
        key.push_str(query);
    }

    if method.is_read() {
        return key;
    }

    if let Some(body) = body {
        match serde_json::to_string(body) {
            Ok(serialized) => {
                let prefix: String = serialized.chars().take(BODY_FINGERPRINT_CHARS).collect();
                key.push_str(&format!("#{}:{}", serialized.len(), prefix));
            }
            Err(e) => {
                debug!(endpoint, error = %e, "body not serializable, key omits fingerprint");
            }
        }
    }

    key
}
