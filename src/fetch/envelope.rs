//! Backend response envelope
//!
//! The analytics backend wraps every payload as
//! `{"status": "success" | "error", "data": ..., "error": ...}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Wire form of a backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: EnvelopeStatus,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Turns the status string convention into a typed result.
    ///
    /// A success with `data` null or absent is decoded from JSON `null`, so it
    /// is accepted for payloads that admit null (`Value`, `Option<_>`, `()`).
    pub fn into_result(self) -> Result<T, FetchError> {
        match self.status {
            EnvelopeStatus::Success => match self.data {
                Some(data) => Ok(data),
                None => serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                    FetchError::Decode("success response without data".to_string())
                }),
            },
            EnvelopeStatus::Error => Err(FetchError::Application(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}
