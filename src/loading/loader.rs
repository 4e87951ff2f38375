//! Loading-state wrapper
//!
//! Tracks one async operation through idle, loading, success and error, and
//! publishes every change to observers.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::error::LoadError;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Operation<T> = Arc<dyn Fn() -> BoxFuture<Result<T, LoadError>> + Send + Sync>;

// == State ==
/// Snapshot of an operation's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState<T> {
    pub is_loading: bool,
    pub error: Option<LoadError>,
    pub data: Option<T>,
    /// Retries of the current operation since it last succeeded
    pub retry_count: u32,
}

impl<T> Default for LoadingState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            error: None,
            data: None,
            retry_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl<T> LoadingState<T> {
    pub fn status(&self) -> LoadStatus {
        if self.is_loading {
            LoadStatus::Loading
        } else if self.error.is_some() {
            LoadStatus::Error
        } else if self.data.is_some() {
            LoadStatus::Success
        } else {
            LoadStatus::Idle
        }
    }
}

// == Config ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// How many times `retry()` may run before failing with `RetriesExhausted`
    pub max_retries: u32,
    /// Wait before the first retry, doubled for each further one
    pub retry_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

// == Loader ==
pub struct Loader<T> {
    config: LoaderConfig,
    state: watch::Sender<LoadingState<T>>,
    last: Mutex<Option<Operation<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Loader<T> {
    pub fn new(config: LoaderConfig) -> Self {
        let (state, _) = watch::channel(LoadingState::default());
        Self {
            config,
            state,
            last: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn state(&self) -> LoadingState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<LoadingState<T>> {
        self.state.subscribe()
    }

    // == Execute ==
    /// Runs `f`, tracking it in the state, and remembers it for [`retry`](Self::retry).
    ///
    /// Replacing the remembered operation resets `retry_count`. Any error is
    /// normalized into [`LoadError::Failed`]. Previous data is kept when `f`
    /// fails.
    pub async fn execute<F, Fut, E>(&self, f: F) -> Result<T, LoadError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        let operation: Operation<T> = Arc::new(move || {
            let fut = f();
            Box::pin(async move { fut.await.map_err(LoadError::from_display) })
        });
        *self.last_operation() = Some(Arc::clone(&operation));
        // A new operation starts with a fresh retry budget.
        self.state.send_modify(|state| state.retry_count = 0);

        self.run(operation).await
    }

    // == Retry ==
    /// Re-runs the last operation after an exponentially growing delay.
    pub async fn retry(&self) -> Result<T, LoadError> {
        let operation = self
            .last_operation()
            .clone()
            .ok_or(LoadError::NothingToRetry)?;

        let attempt = self.state.borrow().retry_count;
        if attempt >= self.config.max_retries {
            let error = LoadError::RetriesExhausted { attempts: attempt };
            self.state.send_modify(|state| state.error = Some(error.clone()));
            return Err(error);
        }

        self.state.send_modify(|state| state.retry_count += 1);
        let delay = self
            .config
            .retry_delay
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
        debug!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "retrying load");
        tokio::time::sleep(delay).await;

        self.run(operation).await
    }

    /// Back to idle: clears data, error and the remembered operation.
    pub fn reset(&self) {
        *self.last_operation() = None;
        self.state.send_replace(LoadingState::default());
    }

    async fn run(&self, operation: Operation<T>) -> Result<T, LoadError> {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
        let _loading = LoadingGuard { state: &self.state };

        let result = operation().await;

        self.state.send_modify(|state| match &result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.error = None;
                state.retry_count = 0;
            }
            Err(error) => state.error = Some(error.clone()),
        });
        result
    }

    fn last_operation(&self) -> std::sync::MutexGuard<'_, Option<Operation<T>>> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Loader<T> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

/// Clears `is_loading` when the run ends, including when it is cancelled.
struct LoadingGuard<'a, T> {
    state: &'a watch::Sender<LoadingState<T>>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.is_loading = false);
    }
}
