//! HTTP client for the analytics backend
//!
//! Performs envelope-aware GET requests through a [`RetryExecutor`].

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{ApiEnvelope, RetryExecutor};

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY: usize = 512;

/// Client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryExecutor,
}

impl ApiClient {
    /// Builds a client; each request is bounded by the executor's timeout.
    pub fn new(base_url: impl Into<String>, retry: RetryExecutor) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(retry.config().timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            retry,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path; a query string is kept as-is.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // == Get JSON ==
    /// GETs `path` and unwraps the response envelope, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        self.retry.run(&url, || self.fetch_once(&url)).await
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "backend response");

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        envelope.into_result()
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.retry.config().timeout)
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Maps a non-success HTTP status to the error taxonomy.
fn status_error(status: StatusCode, body: &[u8]) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
        StatusCode::FORBIDDEN => FetchError::Forbidden,
        _ => {
            let message = error_message(status, body);
            if status.is_server_error() {
                FetchError::Server {
                    status: status.as_u16(),
                    message,
                }
            } else {
                FetchError::Http {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(message) = parsed.error.or(parsed.message) {
            return message;
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        text.chars().take(MAX_ERROR_BODY).collect()
    }
}
