//! REST Client Module
//!
//! Thin wrapper over reqwest that routes reads through the response cache and
//! invalidates cached reads after writes.

mod api_client;
mod auth;
mod options;

pub use api_client::{ApiClient, SharedStore};
pub use auth::{Anonymous, SessionToken, TokenProvider};
pub use options::{CacheOptions, RequestOptions};
