//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Timestamps come from the tokio clock, so a paused test runtime controls
/// expiry the same way it controls timers.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was stored
    pub created_at: Instant,
    /// Absolute expiry; the entry is dead from this instant on
    pub expires_at: Instant,
    /// Last successful read (or creation time if never read)
    pub accessed_at: Instant,
    /// Number of successful reads
    pub hit_count: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();

        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
            accessed_at: now,
            hit_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is greater
    /// than or equal to its expiry, so a read exactly `ttl` after the write misses.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied instant.
    ///
    /// Live while `now < expires_at`; expired from `expires_at` on (inclusive).
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Record Hit ==
    /// Updates access metadata after a successful read.
    pub fn record_hit(&mut self, now: Instant) {
        self.accessed_at = now;
        self.hit_count += 1;
    }

    // == Time To Live ==
    /// Returns remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Age of the entry since it was stored.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}
