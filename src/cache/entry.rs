//! Cache Entry Module
//!
//! Defines a stored value together with its atomically updatable freshness marker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::ExpiryPolicy;

// == Cache Entry ==
/// A single stored value. Never handed out; callers only receive clones of `value`.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    /// The stored value, opaque to the cache
    value: V,
    /// Last access (sliding) or absolute expiry (fixed), in nanoseconds
    /// since the owning cache's origin
    marker: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped for `policy` at `now`.
    pub(crate) fn new(value: V, policy: ExpiryPolicy, now: u64, ttl: u64) -> Self {
        Self {
            value,
            marker: AtomicU64::new(policy.stamp(now, ttl)),
        }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn marker(&self) -> u64 {
        self.marker.load(Ordering::Acquire)
    }

    // == Is Expired ==
    /// Checks the entry against `policy` at `now`.
    pub(crate) fn is_expired(&self, policy: ExpiryPolicy, now: u64, ttl: u64) -> bool {
        policy.is_expired(self.marker(), now, ttl)
    }

    // == Touch ==
    /// Moves the last-access marker forward. Safe under a shared lock:
    /// concurrent readers race only on `fetch_max`, which never moves it back.
    pub(crate) fn touch(&self, now: u64) {
        self.marker.fetch_max(now, Ordering::AcqRel);
    }
}

// == Clock ==
/// Monotonic clock measuring nanoseconds since a fixed origin.
///
/// Backed by `tokio::time::Instant`, so paused test runtimes control it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clock {
    origin: Instant,
}

impl Clock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub(crate) fn now(&self) -> u64 {
        duration_to_nanos(Instant::now().saturating_duration_since(self.origin))
    }
}

/// Converts a duration to whole nanoseconds, saturating at `u64::MAX`.
pub(crate) fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
