//! Retry logic with exponential backoff
//!
//! Wraps a fallible async operation with bounded retries, capped exponential
//! delays, error classification and an overall deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::FetchError;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt; `retries + 1` attempts in total
    pub retries: u32,

    /// Delay before the first retry, doubled for each further retry
    pub retry_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Deadline for the whole execution, waits included
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self {
            retries: 0,
            ..Default::default()
        }
    }

    /// Delay after failed attempt `attempt` (0-indexed): `min(base * 2^attempt, cap)`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Error classification for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClassification {
    /// Should retry (transient error)
    Retry,

    /// Should not retry (permanent error)
    NoRetry,
}

/// Trait for errors that can be classified for retry
pub trait RetryableError: std::fmt::Display + Sized {
    fn classify(&self) -> RetryClassification;

    /// Error reported when the execution deadline passes.
    fn timed_out(after: Duration) -> Self;

    /// Whether the failure means the session must be dropped.
    fn is_auth_failure(&self) -> bool {
        false
    }
}

impl RetryableError for FetchError {
    fn classify(&self) -> RetryClassification {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) | FetchError::Server { .. } => {
                RetryClassification::Retry
            }
            FetchError::Unauthorized
            | FetchError::Forbidden
            | FetchError::Http { .. }
            | FetchError::Application(_)
            | FetchError::Decode(_) => RetryClassification::NoRetry,
        }
    }

    fn timed_out(after: Duration) -> Self {
        FetchError::Timeout(after)
    }

    fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }
}

// == Notifications ==
/// Sink for failures a user should hear about (toast, alert, log).
///
/// All methods default to doing nothing.
pub trait ErrorNotifier: Send + Sync {
    /// The last allowed attempt failed.
    fn retries_exhausted(&self, _operation: &str, _attempts: u32, _error: &str) {}

    /// A non-retryable error ended the execution.
    fn rejected(&self, _operation: &str, _error: &str) {}

    /// An authentication failure was seen; the session should be invalidated.
    fn session_invalidated(&self, _operation: &str) {}
}

/// Notifier that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ErrorNotifier for TracingNotifier {
    fn retries_exhausted(&self, operation: &str, attempts: u32, error: &str) {
        error!(operation, attempts, error, "request failed after all retries");
    }

    fn rejected(&self, operation: &str, error: &str) {
        warn!(operation, error, "request rejected");
    }

    fn session_invalidated(&self, operation: &str) {
        warn!(operation, "authentication required, session invalidated");
    }
}

// == Executor ==
/// Runs operations under a [`RetryConfig`].
#[derive(Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
    notifier: Option<Arc<dyn ErrorNotifier>>,
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ErrorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an async operation with retry logic.
    ///
    /// When the deadline passes the in-flight attempt is dropped and no
    /// further retries run.
    pub async fn run<T, E, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T, E>
    where
        E: RetryableError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.attempt_loop(operation_name, operation)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{}: abandoned after {:?} deadline",
                    operation_name, timeout
                );
                Err(E::timed_out(timeout))
            }
        }
    }

    async fn attempt_loop<T, E, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        E: RetryableError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;

        loop {
            debug!("{}: attempt {}", operation_name, attempt + 1);

            let e = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if e.is_auth_failure() {
                if let Some(notifier) = &self.notifier {
                    notifier.session_invalidated(operation_name);
                }
            }

            if e.classify() == RetryClassification::NoRetry {
                debug!(
                    "{}: non-retryable error on attempt {}: {}",
                    operation_name,
                    attempt + 1,
                    e
                );
                if let Some(notifier) = &self.notifier {
                    notifier.rejected(operation_name, &e.to_string());
                }
                return Err(e);
            }

            if attempt >= self.config.retries {
                warn!(
                    "{}: max retries ({}) exceeded: {}",
                    operation_name, self.config.retries, e
                );
                if let Some(notifier) = &self.notifier {
                    notifier.retries_exhausted(operation_name, attempt + 1, &e.to_string());
                }
                return Err(e);
            }

            let delay = self.config.delay_for_attempt(attempt);
            warn!(
                "{}: attempt {} failed, retrying in {:?}: {}",
                operation_name,
                attempt + 1,
                delay,
                e
            );

            sleep(delay).await;
            attempt += 1;
        }
    }
}
