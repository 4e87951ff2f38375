//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction and
//! per-category TTL resolution.

mod entry;
mod lru;
mod stats;
mod store;
mod ttl;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use ttl::{TtlPolicy, DEFAULT_CATEGORY_TTLS};

/// A cache store shared between tasks.
///
/// Reads take the write lock too, since a hit updates recency and counters.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

/// Wraps a new store for sharing.
pub fn shared<V: Clone>(max_entries: usize, default_ttl: Duration) -> SharedCache<V> {
    Arc::new(RwLock::new(CacheStore::new(max_entries, default_ttl)))
}
