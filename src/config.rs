//! Configuration Module
//!
//! Handles cache configuration: sweep cadence, time-to-live and expiry policy.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::ExpiryPolicy;
use crate::error::{CacheError, Result};

/// Default interval between background sweeps in milliseconds
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Default time-to-live in milliseconds
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Longest accepted sweep interval (365 days). The sweeper schedules its
/// first tick at `now + interval`, which must stay representable.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Cache configuration parameters.
///
/// Durations are (de)serialized as whole milliseconds. Sub-millisecond
/// durations are rounded up so a positive duration never reloads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Interval between background sweeps
    #[serde(rename = "sweep_interval_ms", with = "duration_ms")]
    pub sweep_interval: Duration,
    /// Idle or absolute lifetime of an entry, depending on `policy`
    #[serde(rename = "ttl_ms", with = "duration_ms")]
    pub ttl: Duration,
    /// How `ttl` is measured
    pub policy: ExpiryPolicy,
}

impl CacheConfig {
    /// Creates a sliding-idle configuration with the given durations.
    pub fn new(sweep_interval: Duration, ttl: Duration) -> Self {
        Self {
            sweep_interval,
            ttl,
            policy: ExpiryPolicy::Sliding,
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `VCACHE_SWEEP_INTERVAL_MS` - Sweep interval in ms (default: 1000)
    /// - `VCACHE_TTL_MS` - TTL in ms (default: 300000)
    /// - `VCACHE_POLICY` - `sliding` or `fixed` (default: sliding)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: Duration::from_millis(
                env::var("VCACHE_SWEEP_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_MS),
            ),
            ttl: Duration::from_millis(
                env::var("VCACHE_TTL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TTL_MS),
            ),
            policy: env::var("VCACHE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the expiry policy.
    pub fn with_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rejects zero durations and sweep intervals above [`MAX_SWEEP_INTERVAL`].
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be positive".to_string(),
            ));
        }
        if self.sweep_interval > MAX_SWEEP_INTERVAL {
            return Err(CacheError::InvalidConfig(format!(
                "sweep interval must not exceed {:?}",
                MAX_SWEEP_INTERVAL
            )));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            ttl: Duration::from_millis(DEFAULT_TTL_MS),
            policy: ExpiryPolicy::Sliding,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = value.as_nanos().div_ceil(1_000_000);
        serializer.serialize_u64(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
