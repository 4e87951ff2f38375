//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::orchestrator::CallTimings;

/// Response body for GET /data/:category/*path
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse {
    /// Cache key the data is stored under
    pub key: String,
    pub data: Value,
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub key: String,
    /// False when the key was not cached
    pub removed: bool,
}

/// Response body for prefix invalidation and manual sweeps
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for POST /cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Backend call durations, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct TimingSummary {
    pub calls: u64,
    pub failures: u64,
    pub average_ms: f64,
    pub slowest_key: Option<String>,
    pub slowest_ms: Option<f64>,
}

impl From<CallTimings> for TimingSummary {
    fn from(timings: CallTimings) -> Self {
        let average_ms = millis(timings.average());
        let (slowest_key, slowest_ms) = match timings.slowest {
            Some((key, elapsed)) => (Some(key), Some(millis(elapsed))),
            None => (None, None),
        };
        Self {
            calls: timings.calls,
            failures: timings.failures,
            average_ms,
            slowest_key,
            slowest_ms,
        }
    }
}

fn millis(duration: std::time::Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because their TTL passed
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Percentage of reads that hit, 0 to 100
    pub hit_rate: f64,
    pub calls: TimingSummary,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, timings: CallTimings) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            calls: timings.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
