//! Eviction Sweeper Task
//!
//! Background task that periodically removes expired cache entries until
//! its cancellation token fires.

use std::fmt::Debug;
use std::hash::Hash;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a task on `handle` that sweeps `cache` every sweep interval.
///
/// Each iteration waits for either the next tick or cancellation, checking
/// cancellation first so a token that fires together with a tick stops the
/// loop without another sweep. The first tick happens one full interval
/// after start. The task holds only a weak reference to the store and exits
/// on the next tick once every `Cache` handle has been dropped.
///
/// # Returns
/// A JoinHandle that completes once the sweeper has stopped its timer and
/// exited.
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let handle = spawn_sweeper(&Handle::current(), &cache, token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_sweeper<K, V>(
    handle: &Handle,
    cache: &Cache<K, V>,
    token: CancellationToken,
) -> JoinHandle<()>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let period = cache.sweep_interval();
    let store = cache.downgrade();

    handle.spawn(async move {
        info!(interval = ?period, "Starting eviction sweeper");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    info!("Eviction sweeper cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(store) = store.upgrade() else {
                        info!("Cache dropped, stopping eviction sweeper");
                        break;
                    };

                    let removed = store.evict();
                    if removed > 0 {
                        debug!(removed, "Eviction sweep removed expired entries");
                    } else {
                        debug!("Eviction sweep found no expired entries");
                    }
                }
            }
        }
    })
}
