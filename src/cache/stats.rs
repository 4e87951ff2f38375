//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, writes and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
///
/// Counters only move forward; [`CacheStore::clear`](super::CacheStore::clear)
/// is the one place they are reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of writes
    pub sets: u64,
    /// Number of entries evicted due to LRU capacity pressure
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads served or missed, i.e. every `get`.
    pub fn reads(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Share of reads that hit, as a percentage (3 hits, 1 miss → 75.0).
    ///
    /// 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.reads() {
            0 => 0.0,
            reads => self.hits as f64 * 100.0 / reads as f64,
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    /// Gauge, overwritten rather than accumulated.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
