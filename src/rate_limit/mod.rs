//! Rate Limiting Module
//!
//! Debounce and throttle wrappers for repeatedly triggered work such as
//! search-as-you-type lookups or scroll-driven refreshes.

mod debounce;
mod throttle;

pub use debounce::Debouncer;
pub use throttle::Throttler;
