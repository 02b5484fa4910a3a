//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the gateway is up.
//!
//! # Tasks
//! - Stale sweep: removes expired cache entries at the configured interval

mod sweeper;

pub use sweeper::spawn_sweeper;
