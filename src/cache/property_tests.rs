//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain HashMap model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::cache::{Cache, ExpiryPolicy};
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_SWEEP: Duration = Duration::from_secs(60);
const TEST_LONG_TTL: Duration = Duration::from_secs(3600);

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

fn policy_strategy() -> impl Strategy<Value = ExpiryPolicy> {
    prop_oneof![Just(ExpiryPolicy::Sliding), Just(ExpiryPolicy::Fixed)]
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Runs `f` on a single-threaded runtime whose clock only moves when told to.
fn with_paused_clock<F: std::future::Future<Output = ()>>(f: F) {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
        .block_on(f)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Uniqueness and read-after-write: with no expiry in play the cache
    // behaves exactly like a non-upserting map.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache: Cache<String, String> = Cache::new(TEST_SWEEP, TEST_LONG_TTL).unwrap();
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    let result = cache.add(key.clone(), value.clone());
                    if model.contains_key(&key) {
                        prop_assert!(result.is_err(), "duplicate add of {} must fail", key);
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(key.clone(), value.clone());
                        prop_assert_eq!(cache.get(&key), Some(value));
                        expected_hits += 1;
                    }
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&key);
                    match model.get(&key) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                    model.remove(&key);
                    prop_assert!(!cache.contains_key(&key));
                }
            }
            prop_assert_eq!(cache.len(), model.len());
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.evictions, 0);
    }

    // Delete is idempotent for any key, present or not.
    #[test]
    fn prop_delete_idempotent(
        keys in prop::collection::hash_set(key_strategy(), 0..10),
        target in key_strategy(),
        repeats in 1usize..4
    ) {
        let cache: Cache<String, String> = Cache::new(TEST_SWEEP, TEST_LONG_TTL).unwrap();
        for key in &keys {
            cache.add(key.clone(), "v".to_string()).unwrap();
        }

        for _ in 0..repeats {
            cache.delete(&target);
        }

        prop_assert_eq!(cache.get(&target), None);
        let expected = keys.len() - usize::from(keys.contains(&target));
        prop_assert_eq!(cache.len(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // A sweep removes exactly the entries that are expired when it runs,
    // for both policies.
    #[test]
    fn prop_evict_removes_exactly_expired(
        policy in policy_strategy(),
        offsets in prop::collection::vec(0u64..2_000, 1..30),
        sweep_at in 0u64..4_000
    ) {
        let ttl_ms = 1_000u64;
        let mut expected_live = HashSet::new();
        let mut outcome = None;

        // Entry i is added at offsets[i] (sorted); under either policy it is
        // dead at `sweep_at` iff sweep_at - added >= ttl, since nothing reads it.
        let mut added_at = offsets.clone();
        added_at.sort_unstable();
        for (i, at) in added_at.iter().enumerate() {
            if sweep_at < *at {
                continue;
            }
            if sweep_at - at < ttl_ms {
                expected_live.insert(i);
            }
        }

        with_paused_clock(async {
            let config = CacheConfig::new(TEST_SWEEP, Duration::from_millis(ttl_ms))
                .with_policy(policy);
            let cache: Cache<usize, u64> = Cache::with_config(config).unwrap();

            let mut now = 0u64;
            let mut inserted = 0usize;
            for (i, at) in added_at.iter().enumerate() {
                if *at > sweep_at {
                    break;
                }
                tokio::time::advance(Duration::from_millis(at - now)).await;
                now = *at;
                cache.add(i, *at).unwrap();
                inserted += 1;
            }
            tokio::time::advance(Duration::from_millis(sweep_at - now)).await;

            let removed = cache.evict();
            let live: HashSet<usize> = (0..inserted).filter(|i| cache.contains_key(i)).collect();
            outcome = Some((removed, inserted, live, cache.len()));
        });

        let (removed, inserted, live, len) = outcome.unwrap();
        prop_assert_eq!(removed, inserted - expected_live.len());
        prop_assert_eq!(len, expected_live.len());
        prop_assert_eq!(live, expected_live);
    }

    // Under the sliding policy a read at any point before expiry restarts the
    // idle window; under the fixed policy it does not.
    #[test]
    fn prop_read_refresh_follows_policy(
        policy in policy_strategy(),
        read_at in 1u64..1_000,
        check_after in 1u64..1_000
    ) {
        let ttl_ms = 1_000u64;
        let mut outcome = None;

        with_paused_clock(async {
            let config = CacheConfig::new(TEST_SWEEP, Duration::from_millis(ttl_ms))
                .with_policy(policy);
            let cache: Cache<&str, &str> = Cache::with_config(config).unwrap();
            cache.add("k", "v").unwrap();

            tokio::time::advance(Duration::from_millis(read_at)).await;
            let first = cache.get("k");

            tokio::time::advance(Duration::from_millis(check_after)).await;
            outcome = Some((first, cache.contains_key("k")));
        });

        let (first, alive) = outcome.unwrap();
        prop_assert_eq!(first, Some("v"));
        let expected_alive = match policy {
            ExpiryPolicy::Sliding => check_after < ttl_ms,
            ExpiryPolicy::Fixed => read_at + check_after < ttl_ms,
        };
        prop_assert_eq!(alive, expected_alive);
    }
}
