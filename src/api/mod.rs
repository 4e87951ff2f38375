//! API Module
//!
//! HTTP handlers and routing for the analytics gateway.
//!
//! # Endpoints
//! - `GET /data/:category/*path` - Cached backend data
//! - `DELETE /cache/:key` - Invalidate one key
//! - `DELETE /cache?prefix=` - Invalidate every key with a prefix
//! - `POST /cache/clear` - Drop all entries and reset counters
//! - `POST /cache/cleanup` - Sweep expired entries now
//! - `GET /stats` - Cache statistics and call timings
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
