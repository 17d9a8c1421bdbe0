//! Axum HTTP API server for the intensify service.
//!
//! This crate provides:
//! - The multipart upload endpoint that runs the intensification pipeline
//! - The artifact retrieval endpoint
//! - Health endpoints, request-id/logging middleware and CORS
//! - Environment-driven configuration

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
