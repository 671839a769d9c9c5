//! Axum HTTP API server for the OOTD content backend.
//!
//! This crate provides:
//! - Trend-based content generation through the workflow webhook
//! - Direct image generation against Gemini
//! - Clip assembly on top of `ootd-media`
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
