//! Analytics Cache - caching and API orchestration for creator analytics
//!
//! TTL/LRU cache with per-category TTLs, cached remote calls with
//! single-flight, retry with exponential backoff, debounce/throttle and an
//! observable loading state. The `analytics_cache` binary serves cached
//! backend data over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loading;
pub mod models;
pub mod orchestrator;
pub mod rate_limit;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, SharedCache, TtlPolicy};
pub use config::Config;
pub use error::{FetchError, LoadError};
pub use fetch::{ApiClient, RetryConfig, RetryExecutor};
pub use loading::{Loader, LoadingState};
pub use orchestrator::{CachedApi, CallOptions};
pub use rate_limit::{Debouncer, Throttler};
pub use tasks::spawn_cleanup_task;
