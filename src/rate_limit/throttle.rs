//! Throttle
//!
//! Caps how often a function runs: at most once per interval.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Runs `f` on the first call, then drops calls until `interval` has passed
/// since the last run.
pub struct Throttler<A> {
    interval: Duration,
    f: Box<dyn Fn(A) + Send + Sync>,
    last_run: Mutex<Option<Instant>>,
}

impl<A> Throttler<A> {
    pub fn new(interval: Duration, f: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            interval,
            f: Box::new(f),
            last_run: Mutex::new(None),
        }
    }

    /// Runs `f(arg)` unless inside the window. Returns whether it ran.
    pub fn call(&self, arg: A) -> bool {
        let now = Instant::now();
        {
            let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
            if last_run.is_some_and(|at| now.duration_since(at) < self.interval) {
                return false;
            }
            *last_run = Some(now);
        }

        (self.f)(arg);
        true
    }

    /// Closes the window so the next call runs immediately.
    pub fn reset(&self) {
        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
