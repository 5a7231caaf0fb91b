//! System/health API handlers.
//!
//! # Key invariants and assumptions
//! - Health checks are fast and side-effect free.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Access-control health", body = HealthStatus),
        (status = 500, description = "Storage unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return service health.
///
/// # What it does
/// Probes the backing store and returns `ok` with the backend name.
///
/// # Errors
/// - Returns 500 if the storage health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.store.health_check().await {
        return Err(api_internal("storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        backend: state.store.backend_name().to_string(),
    }))
}
