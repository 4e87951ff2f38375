//! Configuration Module
//!
//! Handles loading and validating cache, retry and gateway settings from
//! environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{TtlPolicy, DEFAULT_CATEGORY_TTLS};
use crate::error::ConfigError;
use crate::fetch::RetryConfig;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// TTL in milliseconds for categories without their own entry
    pub default_ttl_ms: u64,
    /// Per-category TTLs in milliseconds
    pub category_ttls: HashMap<String, u64>,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Retries after the first failed attempt
    pub retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Overall deadline for one remote call, retries included
    pub timeout_ms: u64,
    /// Analytics backend, e.g. `https://api.example.com/v1`
    pub api_base_url: Option<String>,
    /// Bearer token forwarded to the backend
    pub api_token: Option<String>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_CATEGORY_TTLS` - `name=ms` pairs separated by commas, merged over the built-in table
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `API_RETRIES` - Retry count (default: 3)
    /// - `API_RETRY_DELAY_MS` - Base backoff delay (default: 1000)
    /// - `API_TIMEOUT_MS` - Call deadline (default: 30000)
    /// - `API_BASE_URL` - Backend base URL (default: unset)
    /// - `API_TOKEN` - Backend bearer token (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut category_ttls = defaults.category_ttls;
        if let Ok(raw) = env::var("CACHE_CATEGORY_TTLS") {
            category_ttls.extend(parse_category_ttls(&raw));
        }

        Self {
            max_size: env_or("CACHE_MAX_SIZE", defaults.max_size),
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", defaults.default_ttl_ms),
            category_ttls,
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            retries: env_or("API_RETRIES", defaults.retries),
            retry_delay_ms: env_or("API_RETRY_DELAY_MS", defaults.retry_delay_ms),
            timeout_ms: env_or("API_TIMEOUT_MS", defaults.timeout_ms),
            api_base_url: env::var("API_BASE_URL").ok().filter(|v| !v.is_empty()),
            api_token: env::var("API_TOKEN").ok().filter(|v| !v.is_empty()),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    // == Validate ==
    /// Rejects values the cache and retry layers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(invalid("CACHE_MAX_SIZE", "must be at least 1"));
        }
        if self.default_ttl_ms == 0 {
            return Err(invalid("CACHE_DEFAULT_TTL_MS", "must be positive"));
        }
        if let Some((name, _)) = self.category_ttls.iter().find(|(_, ttl)| **ttl == 0) {
            return Err(invalid(
                "CACHE_CATEGORY_TTLS",
                format!("TTL for '{}' must be positive", name),
            ));
        }
        if self.cleanup_interval == 0 {
            return Err(invalid("CLEANUP_INTERVAL", "must be positive"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("API_TIMEOUT_MS", "must be positive"));
        }
        Ok(())
    }

    /// TTL table for the orchestrator.
    pub fn ttl_policy(&self) -> TtlPolicy {
        self.category_ttls.iter().fold(
            TtlPolicy::new(Duration::from_millis(self.default_ttl_ms)),
            |policy, (name, ttl)| policy.with_category(name.clone(), Duration::from_millis(*ttl)),
        )
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            ..RetryConfig::default()
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: 100,
            default_ttl_ms: 300_000,
            category_ttls: DEFAULT_CATEGORY_TTLS
                .iter()
                .map(|(name, ttl)| (name.to_string(), ttl.as_millis() as u64))
                .collect(),
            cleanup_interval: 60,
            retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 30_000,
            api_base_url: None,
            api_token: None,
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

/// Parses `channelHealth=900000,revenue=1800000`. Malformed pairs are skipped.
fn parse_category_ttls(raw: &str) -> HashMap<String, u64> {
    raw.split(',')
        .filter_map(|pair| {
            let (name, ttl) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), ttl.trim().parse().ok()?))
        })
        .collect()
}
