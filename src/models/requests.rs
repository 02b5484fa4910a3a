//! Request DTOs for the gateway's cache administration API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::key::BODY_FINGERPRINT_CHARS;

/// Upper bound for an invalidation prefix; keys themselves stay well below it.
pub const MAX_PREFIX_LENGTH: usize = 512 + BODY_FINGERPRINT_CHARS;

/// Request body for raw prefix invalidation (POST /cache/invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePrefixRequest {
    /// Every cached key starting with this string is dropped
    pub prefix: String,
}

impl InvalidatePrefixRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid. An empty
    /// prefix would match every key, so it is refused here; use a resource
    /// invalidation or restart to clear everything.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        if self.prefix.len() > MAX_PREFIX_LENGTH {
            return Some(format!(
                "Prefix exceeds maximum length of {} characters",
                MAX_PREFIX_LENGTH
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_request_deserialize() {
        let json = r#"{"prefix": "GET_/products"}"#;
        let req: InvalidatePrefixRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.prefix, "GET_/products");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_prefix() {
        let req = InvalidatePrefixRequest {
            prefix: String::new(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_overlong_prefix() {
        let req = InvalidatePrefixRequest {
            prefix: "x".repeat(MAX_PREFIX_LENGTH + 1),
        };
        assert!(req.validate().is_some());
    }
}
