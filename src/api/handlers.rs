//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, RawQuery, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache;
use crate::config::Config;
use crate::error::{FetchError, Result, ServiceError};
use crate::fetch::{ApiClient, RetryExecutor, TracingNotifier};
use crate::models::{
    ClearResponse, DataQuery, DataResponse, HealthResponse, InvalidateResponse, PrefixQuery,
    RemovedResponse, StatsResponse,
};
use crate::orchestrator::{CachedApi, CallOptions};

/// Application state shared across all handlers.
///
/// Backend responses are cached as raw JSON.
#[derive(Clone)]
pub struct AppState {
    pub api: CachedApi<Value>,
    /// Backend client, absent when no base URL is configured
    pub client: Option<ApiClient>,
}

impl AppState {
    pub fn new(api: CachedApi<Value>, client: Option<ApiClient>) -> Self {
        Self { api, client }
    }

    /// Builds the cache, TTL table and backend client from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, FetchError> {
        let cache = cache::shared(config.max_size, Duration::from_millis(config.default_ttl_ms));
        let api = CachedApi::new(cache, config.ttl_policy());

        let client = match &config.api_base_url {
            Some(base_url) => {
                let retry = RetryExecutor::new(config.retry_config())
                    .with_notifier(Arc::new(TracingNotifier));
                let client = ApiClient::new(base_url.clone(), retry)?;
                Some(match &config.api_token {
                    Some(token) => client.with_token(token.clone()),
                    None => client,
                })
            }
            None => None,
        };

        Ok(Self::new(api, client))
    }
}

/// Handler for GET /data/:category/*path
///
/// Serves `path` from the backend through the cache, kept for the category's
/// TTL. Query parameters other than `refresh` are forwarded and become part of
/// the key, `category:path?query` with the pairs sorted. `?refresh=true`
/// bypasses the cache.
pub async fn data_handler(
    State(state): State<AppState>,
    Path((category, path)): Path<(String, String)>,
    Query(query): Query<DataQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<DataResponse>> {
    let client = state.client.as_ref().ok_or(ServiceError::BackendUnavailable)?;
    let target = match DataQuery::forwarded(raw_query.as_deref()) {
        Some(forwarded) => format!("{}?{}", path, forwarded),
        None => path,
    };
    let key = format!("{}:{}", category, target);

    let options = CallOptions::category(category).force_refresh(query.refresh);
    let data = state
        .api
        .cached_call(&key, options, || client.get_json::<Value>(&target))
        .await?;

    Ok(Json(DataResponse { key, data }))
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.api.invalidate(&key).await;
    debug!(key, removed, "invalidated key");

    Json(InvalidateResponse { key, removed })
}

/// Handler for DELETE /cache?prefix=...
pub async fn invalidate_prefix_handler(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> Result<Json<RemovedResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let removed = state.api.invalidate_prefix(&query.prefix).await;
    Ok(Json(RemovedResponse { removed }))
}

/// Handler for POST /cache/clear
///
/// Drops every entry and resets the counters.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.api.clear().await;
    Json(ClearResponse::cleared())
}

/// Handler for POST /cache/cleanup
///
/// Runs the expired-entry sweep now instead of waiting for the background task.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.api.cleanup().await;
    Json(RemovedResponse { removed })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.api.stats().await;
    let timings = state.api.timings().await;

    Json(StatsResponse::new(stats, timings))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlPolicy;
    use serde_json::json;

    fn test_state() -> AppState {
        let api = CachedApi::new(
            cache::shared(100, Duration::from_secs(300)),
            TtlPolicy::default(),
        );
        AppState::new(api, None)
    }

    async fn seed(state: &AppState, key: &str) {
        state
            .api
            .cache()
            .write()
            .await
            .set(key, json!({"views": 1}), None);
    }

    #[tokio::test]
    async fn test_data_without_backend() {
        let state = test_state();

        let result = data_handler(
            State(state),
            Path(("overview".to_string(), "users/1".to_string())),
            Query(DataQuery::default()),
            RawQuery(None),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::BackendUnavailable)));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();
        seed(&state, "overview:user1").await;

        let response = invalidate_handler(State(state.clone()), Path("overview:user1".into())).await;
        assert!(response.removed);

        let response = invalidate_handler(State(state), Path("overview:user1".into())).await;
        assert!(!response.removed);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_handler() {
        let state = test_state();
        seed(&state, "overview:user1:7").await;
        seed(&state, "overview:user1:30").await;
        seed(&state, "revenue:user1").await;

        let response = invalidate_prefix_handler(
            State(state.clone()),
            Query(PrefixQuery {
                prefix: "overview:user1".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.removed, 2);
        assert_eq!(state.api.stats().await.total_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_rejects_empty() {
        let state = test_state();

        let result = invalidate_prefix_handler(
            State(state),
            Query(PrefixQuery {
                prefix: String::new(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_clear_handler_resets_stats() {
        let state = test_state();
        seed(&state, "videos:user1").await;
        state.api.cache().write().await.get("videos:user1");

        let response = clear_handler(State(state.clone())).await;
        assert_eq!(response.message, "Cache cleared");

        let response = stats_handler(State(state)).await;
        assert_eq!(response.total_entries, 0);
        assert_eq!(response.hits, 0);
        assert_eq!(response.sets, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_handler() {
        let state = test_state();
        state.api.cache().write().await.set(
            "realtime:user1",
            json!(1),
            Some(Duration::from_secs(60)),
        );
        seed(&state, "overview:user1").await;

        tokio::time::advance(Duration::from_secs(61)).await;

        let response = cleanup_handler(State(state)).await;
        assert_eq!(response.removed, 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_from_config_without_backend() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(state.client.is_none());
        assert_eq!(state.api.cache().try_read().unwrap().capacity(), 100);
    }

    #[test]
    fn test_from_config_with_backend() {
        let config = Config {
            api_base_url: Some("http://localhost:8000/".into()),
            api_token: Some("secret".into()),
            ..Config::default()
        };

        let state = AppState::from_config(&config).unwrap();
        let client = state.client.unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
