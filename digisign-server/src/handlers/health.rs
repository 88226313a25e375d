//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "healthy")]
    pub status: String,
    /// Service name
    #[schema(example = "DigiSign Backend API")]
    pub service: String,
    /// Server version from Cargo.toml
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Service health
///
/// Static service metadata for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "DigiSign Backend API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
    /// Number of enrolled signature profiles
    pub profiles: usize,
    /// Number of OTP records held (including expired, not yet swept)
    pub pending_otps: usize,
}

/// Readiness probe
///
/// Returns 200 once the stores are initialised, with their current sizes.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, description = "Service is ready", body = ReadyResponse))
)]
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        profiles: state.auth.profile_count(),
        pending_otps: state.auth.pending_otps(),
    })
}
