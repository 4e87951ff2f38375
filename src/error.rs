//! Error types for the caching layer and gateway
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error ==
/// Failure of a remote call against the analytics backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection-level failure (DNS, refused, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The call did not finish in time
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// HTTP 401, the session is no longer valid
    #[error("Authentication required")]
    Unauthorized,

    /// HTTP 403
    #[error("Access forbidden")]
    Forbidden,

    /// HTTP 5xx
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// `status: "error"` inside an otherwise successful response
    #[error("{0}")]
    Application(String),

    /// The response body was not the expected envelope
    #[error("Invalid response body: {0}")]
    Decode(String),
}

// == Load Error ==
/// Normalized error held by a [`Loader`](crate::loading::Loader).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The operation failed; carries its display message
    #[error("{message}")]
    Failed { message: String },

    /// `retry()` was called after the retry budget was spent
    #[error("Maximum retries exceeded ({attempts} attempts)")]
    RetriesExhausted { attempts: u32 },

    /// `retry()` was called before any operation ran
    #[error("No operation to retry")]
    NothingToRetry,
}

impl LoadError {
    /// Normalizes any displayable error.
    pub fn from_display(error: impl std::fmt::Display) -> Self {
        LoadError::Failed {
            message: error.to_string(),
        }
    }
}

// == Config Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

// == Service Error ==
/// Error returned by the gateway handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The backend call failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// No backend URL is configured
    #[error("No analytics backend configured")]
    BackendUnavailable,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Fetch(err) => match err {
                FetchError::Unauthorized => StatusCode::UNAUTHORIZED,
                FetchError::Forbidden => StatusCode::FORBIDDEN,
                FetchError::Application(_) => StatusCode::UNPROCESSABLE_ENTITY,
                FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                FetchError::Http { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                FetchError::Network(_) | FetchError::Server { .. } | FetchError::Decode(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ServiceError::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway handlers.
pub type Result<T> = std::result::Result<T, ServiceError>;
