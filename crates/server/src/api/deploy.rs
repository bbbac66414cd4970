//! Deploy workflow API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use slipway_core::{DeployError, StatusRecord};
use std::sync::Arc;

use crate::metrics::DEPLOY_REQUESTS_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for publishing
#[derive(Debug, Default, Deserialize)]
pub struct PublishBody {
    /// Ref to publish; the configured default ref when omitted
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

/// Request body for rolling back
#[derive(Debug, Default, Deserialize)]
pub struct RollbackBody {
    /// Release to promote
    pub release_id: Option<String>,
}

/// Response for deploy operations: an `ok` flag over the status record.
///
/// Workflow failures and busy rejections use the same shape with
/// `ok: false`, so callers never need a second round-trip to learn what
/// failed or what is currently running.
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub status: StatusRecord,
}

/// Error response for requests rejected before any workflow was considered
#[derive(Debug, Serialize)]
pub struct DeployErrorResponse {
    pub ok: bool,
    pub error: String,
}

fn rejection(status: StatusCode, error: String) -> (StatusCode, Response) {
    (
        status,
        Json(DeployErrorResponse { ok: false, error }).into_response(),
    )
}

/// Renders a busy rejection or workflow failure as `{ok:false, ...status}`.
///
/// Falls back to the bare error shape only when the status read itself
/// fails.
async fn failure_body(
    state: &AppState,
    code: StatusCode,
    error: String,
) -> (StatusCode, Response) {
    match state.orchestrator().status().await {
        Ok(status) => (
            code,
            Json(DeployResponse { ok: false, status }).into_response(),
        ),
        Err(_) => rejection(code, error),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Accept a publish request
///
/// The pipeline runs in the background; the response is the status snapshot
/// at acceptance and clients poll `/status` for completion. An in-flight
/// workflow yields 409 carrying that workflow's record, without disturbing
/// it.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    body: Option<Json<PublishBody>>,
) -> Result<Json<DeployResponse>, (StatusCode, Response)> {
    let Json(body) = body.unwrap_or_default();

    match state.orchestrator().publish(body.git_ref).await {
        Ok(status) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["publish", "accepted"])
                .inc();
            Ok(Json(DeployResponse { ok: true, status }))
        }
        Err(e @ DeployError::Busy) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["publish", "busy"])
                .inc();
            Err(failure_body(&state, StatusCode::CONFLICT, e.to_string()).await)
        }
        Err(e) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["publish", "failed"])
                .inc();
            Err(failure_body(&state, StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).await)
        }
    }
}

/// Roll back to a previously built release
pub async fn rollback(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RollbackBody>>,
) -> Result<Json<DeployResponse>, (StatusCode, Response)> {
    let Json(body) = body.unwrap_or_default();

    let Some(release_id) = body.release_id else {
        return Err(rejection(
            StatusCode::BAD_REQUEST,
            "release_id is required".to_string(),
        ));
    };

    match state.orchestrator().rollback(&release_id).await {
        Ok(status) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["rollback", "completed"])
                .inc();
            Ok(Json(DeployResponse { ok: true, status }))
        }
        Err(e @ DeployError::Busy) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["rollback", "busy"])
                .inc();
            Err(failure_body(&state, StatusCode::CONFLICT, e.to_string()).await)
        }
        Err(e) => {
            DEPLOY_REQUESTS_TOTAL
                .with_label_values(&["rollback", "failed"])
                .inc();
            // The failure has already been merged into the status record;
            // return that snapshot so the caller sees what /status sees.
            Err(failure_body(&state, StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).await)
        }
    }
}
