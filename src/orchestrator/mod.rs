//! Orchestrator Module
//!
//! Combines the cache store with caller-supplied remote calls.

mod cached_api;
mod flight;
mod timings;

pub use cached_api::{CachedApi, CallOptions};
pub use timings::CallTimings;
