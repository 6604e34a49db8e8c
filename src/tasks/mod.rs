//! Background Tasks Module
//!
//! Contains background tasks that run alongside cache callers.
//!
//! # Tasks
//! - Eviction sweeper: removes expired cache entries at the configured interval

mod sweeper;

pub use sweeper::spawn_sweeper;
