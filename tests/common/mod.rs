//! In-process analytics backend for integration tests.
//!
//! Serves the `{"status", "data", "error"}` envelope on an ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use analytics_cache::fetch::{ApiClient, RetryConfig, RetryExecutor};

/// Request counters shared with the running backend.
#[derive(Clone, Default)]
pub struct Backend {
    pub overview_calls: Arc<AtomicU32>,
    pub broken_calls: Arc<AtomicU32>,
    pub private_calls: Arc<AtomicU32>,
    pub flaky_calls: Arc<AtomicU32>,
    pub report_calls: Arc<AtomicU32>,
}

impl Backend {
    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

async fn overview(State(backend): State<Backend>, Path(user): Path<String>) -> Json<Value> {
    let n = backend.overview_calls.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"status": "success", "data": {"user": user, "views": n}}))
}

async fn revenue(Path(user): Path<String>) -> Json<Value> {
    Json(json!({"status": "success", "data": {"user": user, "total": 1250.5}}))
}

async fn broken(State(backend): State<Backend>) -> Json<Value> {
    backend.broken_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"status": "error", "message": "Channel not linked"}))
}

async fn private(State(backend): State<Backend>) -> impl IntoResponse {
    backend.private_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "token expired"})))
}

async fn forbidden() -> impl IntoResponse {
    (StatusCode::FORBIDDEN, Json(json!({"error": "not your channel"})))
}

/// Fails with a 500 on the first request, succeeds afterwards.
async fn flaky(State(backend): State<Backend>) -> impl IntoResponse {
    if backend.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database down"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"status": "success", "data": {"recovered": true}})),
    )
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"message": "no such report"})))
}

async fn garbage() -> &'static str {
    "<html>maintenance</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"status": "success", "data": null}))
}

/// Echoes the query string it received.
async fn report(State(backend): State<Backend>, RawQuery(query): RawQuery) -> Json<Value> {
    backend.report_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"status": "success", "data": {"query": query}}))
}

async fn empty() -> Json<Value> {
    Json(json!({"status": "success", "data": null}))
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({"status": "success", "data": {"authorization": auth}}))
}

/// Starts the backend and returns its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/users/:user/overview", get(overview))
        .route("/users/:user/revenue", get(revenue))
        .route("/broken", get(broken))
        .route("/private", get(private))
        .route("/forbidden", get(forbidden))
        .route("/flaky", get(flaky))
        .route("/missing", get(missing))
        .route("/garbage", get(garbage))
        .route("/slow", get(slow))
        .route("/whoami", get(whoami))
        .route("/analytics/report", get(report))
        .route("/empty", get(empty))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

/// Short delays so retry tests stay fast on a real clock.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        retries: 2,
        retry_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        timeout: Duration::from_secs(2),
    }
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, RetryExecutor::new(fast_retry())).unwrap()
}
