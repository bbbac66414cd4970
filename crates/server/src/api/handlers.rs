use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use slipway_core::{SanitizedConfig, StatusRecord};
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// The persisted status record, the single source of truth for pollers.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusRecord>, impl IntoResponse> {
    match state.orchestrator().status().await {
        Ok(record) => Ok(Json(record)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

pub async fn metrics() -> String {
    encode_metrics()
}
