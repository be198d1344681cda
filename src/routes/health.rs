//! Health Route
//!
//! Reports whether the backend and its document store are usable.

use axum::extract::State;
use axum::Json;

use crate::models::response::HealthResponse;
use crate::state::AppState;

/// Get the health status of the backend
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.is_database_healthy();
    let status = if database { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        ..HealthResponse::default()
    })
}
