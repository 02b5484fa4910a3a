//! Storefront Cache - read-through response cache for the Shiv Mobile Hub API
//!
//! A REST client whose GETs are cached with TTL expiry and single-flight
//! fetching, and whose writes invalidate the cached reads of the resource they
//! touch. The bundled gateway serves the client over HTTP.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, ReadThrough};
pub use client::{ApiClient, CacheOptions, RequestOptions};
pub use config::Config;
pub use error::{ApiError, Result};
pub use tasks::spawn_sweeper;
