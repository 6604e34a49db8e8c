//! Cache Module
//!
//! Provides the generic in-memory store with idle or absolute TTL expiry.

mod entry;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use policy::ExpiryPolicy;
pub use stats::CacheStats;
pub use store::Cache;
