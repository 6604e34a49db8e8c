//! Expiry Policy Module
//!
//! Decides how an entry's freshness marker is stamped, refreshed and judged.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Expiry Policy ==
/// How the configured TTL is measured. Chosen once per cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// TTL counts from the last successful `get`; reads keep an entry warm
    #[default]
    Sliding,
    /// TTL counts from insertion only; reads never extend it
    Fixed,
}

impl ExpiryPolicy {
    /// Marker written by `add`: the last-access time (sliding) or the
    /// absolute expiry (fixed). All values are nanoseconds on the cache clock.
    pub(crate) fn stamp(self, now: u64, ttl: u64) -> u64 {
        match self {
            ExpiryPolicy::Sliding => now,
            ExpiryPolicy::Fixed => now.saturating_add(ttl),
        }
    }

    /// Boundary condition: an entry is dead once the full TTL has elapsed.
    pub(crate) fn is_expired(self, marker: u64, now: u64, ttl: u64) -> bool {
        match self {
            ExpiryPolicy::Sliding => now.saturating_sub(marker) >= ttl,
            ExpiryPolicy::Fixed => now >= marker,
        }
    }

    /// Whether a successful `get` moves the marker forward.
    pub(crate) fn refreshes_on_read(self) -> bool {
        matches!(self, ExpiryPolicy::Sliding)
    }
}

impl FromStr for ExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sliding" | "idle" => Ok(ExpiryPolicy::Sliding),
            "fixed" | "absolute" => Ok(ExpiryPolicy::Fixed),
            other => Err(format!("unknown expiry policy: {other}")),
        }
    }
}
