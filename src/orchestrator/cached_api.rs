//! Cached API calls
//!
//! Serves a key from the cache while it is fresh and otherwise runs the
//! caller's remote call, storing successful results under a category TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheStats, SharedCache, TtlPolicy};
use crate::orchestrator::flight::KeyLocks;
use crate::orchestrator::CallTimings;

// == Call Options ==
/// Per-call knobs for [`CachedApi::cached_call`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Skip the cache read and always call the backend
    pub force_refresh: bool,
    /// Data category used to pick the TTL
    pub cache_type: Option<String>,
    /// Explicit TTL, overrides the category
    pub ttl: Option<Duration>,
}

impl CallOptions {
    pub fn category(cache_type: impl Into<String>) -> Self {
        Self {
            cache_type: Some(cache_type.into()),
            ..Self::default()
        }
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

// == Cached API ==
/// Cache-aside wrapper around remote calls.
///
/// Cloning is cheap and every clone shares the same cache, locks and timings.
#[derive(Clone)]
pub struct CachedApi<V> {
    cache: SharedCache<V>,
    policy: Arc<TtlPolicy>,
    flights: Arc<KeyLocks>,
    timings: Arc<Mutex<CallTimings>>,
    coalesce: bool,
}

impl<V: Clone> CachedApi<V> {
    /// Wraps an existing cache. Concurrent calls for one key are coalesced.
    pub fn new(cache: SharedCache<V>, policy: TtlPolicy) -> Self {
        Self {
            cache,
            policy: Arc::new(policy),
            flights: Arc::new(KeyLocks::new()),
            timings: Arc::new(Mutex::new(CallTimings::default())),
            coalesce: true,
        }
    }

    /// When disabled, concurrent misses on one key each call the backend.
    pub fn with_coalescing(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    // == Cached Call ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its success.
    ///
    /// Errors from `fetch` are returned unchanged and never cached. With
    /// coalescing on, a caller that waited on an in-flight call for the same
    /// key is served from what that call stored.
    pub async fn cached_call<E, F, Fut>(
        &self,
        key: &str,
        options: CallOptions,
        fetch: F,
    ) -> Result<V, E>
    where
        E: std::fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let _flight = if self.coalesce {
            Some(self.flights.acquire(key).await)
        } else {
            None
        };

        if !options.force_refresh {
            if let Some(value) = self.cache.write().await.get(key) {
                debug!(key, "cache hit");
                return Ok(value);
            }
        }

        let started = Instant::now();
        let result = fetch().await;
        let elapsed = started.elapsed();
        self.timings
            .lock()
            .await
            .record(key, elapsed, result.is_ok());

        match result {
            Ok(value) => {
                let ttl = options
                    .ttl
                    .unwrap_or_else(|| self.policy.resolve(options.cache_type.as_deref()));
                debug!(
                    key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    ttl_ms = ttl.as_millis() as u64,
                    forced = options.force_refresh,
                    "remote call succeeded, caching result"
                );
                self.cache
                    .write()
                    .await
                    .set(key, value.clone(), Some(ttl));
                Ok(value)
            }
            Err(e) => {
                warn!(key, elapsed_ms = elapsed.as_millis() as u64, "remote call failed: {}", e);
                Err(e)
            }
        }
    }

    // == Invalidation ==
    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    /// Drops every key starting with `prefix`, e.g. all of one user's overviews.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.cache.write().await.delete_prefix(prefix)
    }

    /// Empties the cache, resets its counters and the call timings.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
        *self.timings.lock().await = CallTimings::default();
    }

    pub async fn cleanup(&self) -> usize {
        self.cache.write().await.cleanup_expired()
    }

    // == Introspection ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn timings(&self) -> CallTimings {
        self.timings.lock().await.clone()
    }

    pub fn cache(&self) -> &SharedCache<V> {
        &self.cache
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }
}
