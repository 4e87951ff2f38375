//! Request and Response models for the gateway API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{DataQuery, PrefixQuery};
pub use responses::{
    ClearResponse, DataResponse, ErrorResponse, HealthResponse, InvalidateResponse,
    RemovedResponse, StatsResponse, TimingSummary,
};
