//! Fetch Module
//!
//! Remote calls against the analytics backend: retry with backoff, the
//! response envelope and the HTTP client built on both.

mod client;
mod envelope;
mod retry;

pub use client::ApiClient;
pub use envelope::{ApiEnvelope, EnvelopeStatus};
pub use retry::{
    ErrorNotifier, RetryClassification, RetryConfig, RetryExecutor, RetryableError,
    TracingNotifier,
};
