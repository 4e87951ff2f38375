//! Debounce
//!
//! Collapses a burst of calls into one invocation after the input goes quiet.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs `f` once `delay` has passed without a newer call.
///
/// Scheduling uses the tokio runtime of the caller.
pub struct Debouncer<A> {
    delay: Duration,
    f: Arc<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new(delay: Duration, f: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            f: Arc::new(f),
            pending: Mutex::new(None),
        }
    }

    /// Cancels the pending invocation, if any, and schedules `f(arg)` after the delay.
    pub fn call(&self, arg: A) {
        let f = Arc::clone(&self.f);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f(arg);
        });

        if let Some(previous) = self.slot().replace(handle) {
            previous.abort();
        }
    }

    /// Drops the pending invocation without running it.
    pub fn cancel(&self) {
        if let Some(pending) = self.slot().take() {
            pending.abort();
        }
    }

    /// Whether an invocation is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        // The guarded handle stays valid even if a holder panicked.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pending) = pending {
            pending.abort();
        }
    }
}
