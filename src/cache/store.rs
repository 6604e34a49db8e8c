//! Cache Store Module
//!
//! Main cache engine: a HashMap behind a single reader/writer lock, with
//! time-based expiry and a cancellable background sweep.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::cache::entry::{duration_to_nanos, CacheEntry, Clock};
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheStats, ExpiryPolicy};
use crate::config::CacheConfig;
use crate::error::{CacheError, KeyExistsError, Result};
use crate::tasks::spawn_sweeper;

/// State shared by every `Cache` handle and the sweeper.
#[derive(Debug)]
pub(crate) struct CacheInner<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Clock,
    config: CacheConfig,
    ttl_nanos: u64,
    stats: StatsRecorder,
}

impl<K: Eq + Hash, V> CacheInner<K, V> {
    /// Removes every entry expired at sweep start in one write-lock scope.
    pub(crate) fn evict(&self) -> usize {
        let policy = self.config.policy;
        let ttl = self.ttl_nanos;

        let removed = {
            let mut entries = self.entries.write();
            let now = self.clock.now();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(policy, now, ttl));
            before - entries.len()
        };

        self.stats.record_sweep(removed);
        removed
    }
}

// == Cache ==
/// Thread-safe generic cache with idle or absolute TTL expiry.
///
/// Cloning is cheap: clones share the same store. Reads take the shared
/// lock; the sliding-idle refresh on `get` updates a per-entry atomic so it
/// never needs to upgrade to the exclusive lock.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use vcache::Cache;
///
/// let cache = Cache::new(Duration::from_secs(1), Duration::from_secs(2)).unwrap();
/// cache.add("a", "x").unwrap();
/// assert_eq!(cache.get("a"), Some("x"));
/// assert!(cache.add("a", "y").is_err());
/// ```
#[derive(Debug)]
pub struct Cache<K, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug,
{
    // == Constructor ==
    /// Creates a sliding-idle cache.
    ///
    /// # Arguments
    /// * `sweep_interval` - Interval between background sweeps
    /// * `ttl` - Idle time after which an untouched entry expires
    ///
    /// Both durations must be non-zero.
    pub fn new(sweep_interval: Duration, ttl: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(sweep_interval, ttl))
    }

    /// Creates a cache from an explicit configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                clock: Clock::new(),
                ttl_nanos: duration_to_nanos(config.ttl),
                config,
                stats: StatsRecorder::default(),
            }),
        })
    }

    // == Add ==
    /// Inserts `value` under `key`, stamping its freshness marker.
    ///
    /// The store is not an upsert map: a live key is rejected with
    /// [`KeyExistsError`] and its value is left untouched. A key whose entry
    /// has expired but not yet been swept counts as absent and is replaced.
    pub fn add(&self, key: K, value: V) -> std::result::Result<(), KeyExistsError<K>> {
        let policy = self.inner.config.policy;
        let ttl = self.inner.ttl_nanos;

        let mut entries = self.inner.entries.write();
        let now = self.inner.clock.now();

        if let Some(existing) = entries.get(&key) {
            if !existing.is_expired(policy, now, ttl) {
                return Err(KeyExistsError { key });
            }
        }

        trace!(key = ?key, "cache add");
        entries.insert(key, CacheEntry::new(value, policy, now, ttl));
        Ok(())
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Returns `None` for absent keys and for expired entries, which are left
    /// in place for the next sweep. Under the sliding policy a hit resets the
    /// entry's idle clock.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let policy = self.inner.config.policy;

        let value = {
            let entries = self.inner.entries.read();
            let now = self.inner.clock.now();

            entries.get(key).and_then(|entry| {
                if entry.is_expired(policy, now, self.inner.ttl_nanos) {
                    return None;
                }
                if policy.refreshes_on_read() {
                    entry.touch(now);
                }
                Some(entry.value().clone())
            })
        };

        match value {
            Some(_) => self.inner.stats.record_hit(),
            None => self.inner.stats.record_miss(),
        }
        value
    }

    // == Contains Key ==
    /// Returns true if `key` holds a live entry. Does not refresh it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = self.inner.entries.read();
        let now = self.inner.clock.now();

        entries.get(key).is_some_and(|entry| {
            !entry.is_expired(self.inner.config.policy, now, self.inner.ttl_nanos)
        })
    }

    // == Delete ==
    /// Removes `key` if present. Deleting an absent key is a no-op.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        if self.inner.entries.write().remove(key).is_some() {
            trace!(key = ?key, "cache delete");
        }
    }

    // == Evict ==
    /// Runs one synchronous sweep and returns the number of removed entries.
    ///
    /// After it returns, no entry that was expired when the sweep took the
    /// lock remains, and no live entry has been removed.
    pub fn evict(&self) -> usize {
        self.inner.evict()
    }

    // == Clear ==
    /// Removes every entry, live or not.
    pub fn clear(&self) {
        self.inner.entries.write().clear();
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones that
    /// have not been swept yet.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.len())
    }

    // == TTL ==
    /// Returns the configured idle or absolute time-to-live.
    pub fn ttl(&self) -> Duration {
        self.inner.config.ttl
    }

    // == Sweep Interval ==
    /// Returns the interval between background sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.inner.config.sweep_interval
    }

    // == Policy ==
    /// Returns the expiry policy chosen at construction.
    pub fn policy(&self) -> ExpiryPolicy {
        self.inner.config.policy
    }

    // == Config ==
    /// Returns the validated configuration this cache was built from.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> Weak<CacheInner<K, V>> {
        Arc::downgrade(&self.inner)
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Start Evict ==
    /// Starts the background sweeper on the current Tokio runtime.
    ///
    /// The sweeper runs `evict` every `sweep_interval` until `cancel` fires.
    /// Passing `None` is rejected with [`CacheError::NilCancellationSignal`]
    /// rather than running forever. An already-cancelled token performs no
    /// sweep and the returned task finishes immediately.
    ///
    /// # Errors
    /// - `NilCancellationSignal` if `cancel` is `None`
    /// - `NoRuntime` if called outside of a Tokio runtime
    pub fn start_evict(&self, cancel: Option<CancellationToken>) -> Result<JoinHandle<()>> {
        let Some(token) = cancel else {
            warn!("Refusing to start sweeper without a cancellation signal");
            return Err(CacheError::NilCancellationSignal);
        };

        let handle = Handle::try_current().map_err(|_| {
            warn!("Refusing to start sweeper outside of a Tokio runtime");
            CacheError::NoRuntime
        })?;

        Ok(spawn_sweeper(&handle, self, token))
    }
}
