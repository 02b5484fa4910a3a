//! Request and Response models for the gateway API
//!
//! DTOs used for serializing/deserializing the cache administration
//! endpoints. Proxied storefront payloads stay as raw JSON.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::InvalidatePrefixRequest;
pub use responses::{DeleteResponse, HealthResponse, InvalidateResponse, StatsResponse};
