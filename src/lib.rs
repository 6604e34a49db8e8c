//! vcache - An embeddable in-memory cache with time-based expiry
//!
//! Entries expire after a period of inactivity (sliding-idle policy) or a
//! fixed time after insertion (fixed-absolute policy). A cancellable
//! background sweeper physically removes expired entries; reads never
//! return them in the meantime.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, ExpiryPolicy};
pub use config::CacheConfig;
pub use error::{CacheError, KeyExistsError, Result};
pub use tasks::spawn_sweeper;
pub use tokio_util::sync::CancellationToken;
