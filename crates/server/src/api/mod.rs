//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area. Shared error types
//! and helpers live here in mod.rs.

pub mod doc;
mod health;
mod pipeline;
mod results;
mod submit;
mod system;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use fraudgate_store::ResultStore;

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

// ── Error helpers ────────────────────────────────────────────────

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: msg.into() }))
}

pub(crate) fn not_found(msg: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: msg.into() }))
}

/// Map a domain error to its HTTP shape. Collaborator failures surface
/// with the collaborator's message, never swallowed.
pub(crate) fn gateway_error(e: fraudgate_core::GatewayError) -> ApiError {
    use fraudgate_core::GatewayError;
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        match &e {
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

pub(crate) fn upstream_unavailable(e: impl Into<fraudgate_core::GatewayError>) -> ApiError {
    gateway_error(e.into())
}

pub(crate) fn service_unavailable(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse { error: msg.into() }),
    )
}

// ── Collaborator guards ──────────────────────────────────────────

pub(crate) fn require_store(state: &AppState) -> Result<Arc<dyn ResultStore>, ApiError> {
    state
        .store
        .clone()
        .ok_or_else(|| service_unavailable("result store not connected"))
}

pub(crate) fn require_kube(
    state: &AppState,
) -> Result<Arc<fraudgate_cluster::KubeClient>, ApiError> {
    state
        .kube
        .clone()
        .ok_or_else(|| service_unavailable("cluster API not configured"))
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::health;
pub use pipeline::pipeline_status;
pub use results::{get_result, list_results, stats_summary};
pub use submit::{evaluate_raw, evaluate_simple};
pub use system::{
    cluster_overview, list_deployments, list_events, list_pods, pod_logs, restart_deployment,
    restart_pod, scale_deployment,
};
