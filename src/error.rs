//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::fmt::Debug;

use thiserror::Error;

// == Key Exists Error ==
/// Returned by `Cache::add` when the key is already live in the store.
///
/// Carries the rejected key back to the caller, who may `delete` it and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("key {key:?} already exists")]
pub struct KeyExistsError<K: Debug> {
    /// The key that was already present
    pub key: K,
}

// == Cache Error Enum ==
/// Unified error type for cache construction and scheduling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `start_evict` was called without a cancellation token
    #[error("cancellation signal is nil")]
    NilCancellationSignal,

    /// `start_evict` was called outside of a Tokio runtime
    #[error("no Tokio runtime available to run the sweeper")]
    NoRuntime,

    /// Rejected configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Key already present, with the key rendered via `Debug`
    #[error("key {0} already exists")]
    KeyExists(String),
}

impl<K: Debug> From<KeyExistsError<K>> for CacheError {
    fn from(err: KeyExistsError<K>) -> Self {
        CacheError::KeyExists(format!("{:?}", err.key))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
