//! Request DTOs for the gateway API
//!
//! Query strings accepted by the data and invalidation endpoints.

use serde::Deserialize;

/// Query for GET /data/:category/*path
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    /// Bypass the cache and refetch from the backend
    #[serde(default)]
    pub refresh: bool,
}

impl DataQuery {
    /// Query string to forward to the backend, from the raw request query.
    ///
    /// `refresh` is dropped and the remaining pairs are sorted, so
    /// `?b=2&a=1` and `?a=1&b=2` name the same cache entry.
    pub fn forwarded(raw: Option<&str>) -> Option<String> {
        let mut pairs: Vec<&str> = raw?
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| pair.split('=').next() != Some("refresh"))
            .collect();
        if pairs.is_empty() {
            return None;
        }

        pairs.sort_unstable();
        Some(pairs.join("&"))
    }
}

/// Query for DELETE /cache
#[derive(Debug, Clone, Deserialize)]
pub struct PrefixQuery {
    pub prefix: String,
}

impl PrefixQuery {
    /// Returns an error message if validation fails, None if valid.
    ///
    /// An empty prefix would match every key; `POST /cache/clear` exists for that.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        None
    }
}
