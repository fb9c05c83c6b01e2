//! Cluster operations endpoints: pods, logs, deployments, events, and an
//! aggregate overview for the ops dashboard.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

use super::{bad_request, require_kube, upstream_unavailable, ApiResult};

const MAX_REPLICAS: i32 = 10;

pub async fn list_pods(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    let pods = kube.list_pods().await.map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "namespace": kube.namespace,
        "count": pods.len(),
        "pods": pods,
    })))
}

#[derive(Deserialize)]
pub struct LogsQuery {
    pub container: Option<String>,
    pub tail_lines: Option<u32>,
    #[serde(default)]
    pub previous: bool,
}

pub async fn pod_logs(
    State(state): State<Arc<AppState>>,
    Path(pod): Path<String>,
    Query(params): Query<LogsQuery>,
) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    let tail_lines = params.tail_lines.unwrap_or(200).clamp(1, 5_000);
    let logs = kube
        .pod_logs(&pod, params.container.as_deref(), tail_lines, params.previous)
        .await
        .map_err(upstream_unavailable)?;
    Ok(Json(json!(logs)))
}

/// Deletes the pod; its controller brings up a replacement.
pub async fn restart_pod(
    State(state): State<Arc<AppState>>,
    Path(pod): Path<String>,
) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    kube.delete_pod(&pod).await.map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "status": "restarting",
        "pod": pod,
        "namespace": kube.namespace,
    })))
}

pub async fn list_deployments(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    let deployments = kube
        .list_deployments()
        .await
        .map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "namespace": kube.namespace,
        "count": deployments.len(),
        "deployments": deployments,
    })))
}

#[derive(Deserialize)]
pub struct ScaleRequest {
    pub replicas: i32,
}

pub async fn scale_deployment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<ScaleRequest>,
) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    if !(0..=MAX_REPLICAS).contains(&req.replicas) {
        return Err(bad_request(format!(
            "replicas must be between 0 and {}",
            MAX_REPLICAS
        )));
    }
    kube.scale_deployment(&name, req.replicas)
        .await
        .map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "status": "scaled",
        "deployment": name,
        "replicas": req.replicas,
    })))
}

pub async fn restart_deployment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    kube.restart_deployment(&name)
        .await
        .map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "status": "restarting",
        "deployment": name,
    })))
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let events = kube
        .list_events(limit)
        .await
        .map_err(upstream_unavailable)?;
    Ok(Json(json!({
        "namespace": kube.namespace,
        "count": events.len(),
        "events": events,
    })))
}

/// One-shot aggregate for the ops landing page.
pub async fn cluster_overview(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let kube = require_kube(&state)?;
    let pods = kube.list_pods().await.map_err(upstream_unavailable)?;
    let deployments = kube
        .list_deployments()
        .await
        .map_err(upstream_unavailable)?;

    let running = pods.iter().filter(|p| p.phase == "Running").count();
    let pending = pods.iter().filter(|p| p.phase == "Pending").count();
    let failed = pods.iter().filter(|p| p.phase == "Failed").count();
    let restarts: i64 = pods.iter().map(|p| p.restarts).sum();

    let healthy_deployments = deployments
        .iter()
        .filter(|d| d.replicas > 0 && d.ready_replicas == d.replicas)
        .count();

    Ok(Json(json!({
        "namespace": kube.namespace,
        "pods": {
            "total": pods.len(),
            "running": running,
            "pending": pending,
            "failed": failed,
            "restarts": restarts,
        },
        "deployments": {
            "total": deployments.len(),
            "healthy": healthy_deployments,
        },
    })))
}
