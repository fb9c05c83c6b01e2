//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        // Results
        .route("/api/v1/results", get(api::list_results))
        // stats/summary MUST precede {msg_id} to avoid "stats" being captured
        .route("/api/v1/results/stats/summary", get(api::stats_summary))
        .route("/api/v1/results/{msg_id}", get(api::get_result))
        // Pipeline topology
        .route("/api/v1/pipeline/status", get(api::pipeline_status))
        // Submission
        .route("/api/v1/transactions/evaluate", post(api::evaluate_simple))
        .route(
            "/api/v1/transactions/evaluate/raw",
            post(api::evaluate_raw),
        )
        // Cluster operations
        .route("/api/v1/system/pods", get(api::list_pods))
        .route("/api/v1/system/pods/{name}/logs", get(api::pod_logs))
        .route("/api/v1/system/pods/{name}/restart", post(api::restart_pod))
        .route("/api/v1/system/deployments", get(api::list_deployments))
        .route(
            "/api/v1/system/deployments/{name}/scale",
            post(api::scale_deployment),
        )
        .route(
            "/api/v1/system/deployments/{name}/restart",
            post(api::restart_deployment),
        )
        .route("/api/v1/system/events", get(api::list_events))
        .route("/api/v1/system/overview", get(api::cluster_overview))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
