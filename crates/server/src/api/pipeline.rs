//! Pipeline topology health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use fraudgate_cluster::{topology, TopologyView};

use crate::state::AppState;

use super::{service_unavailable, upstream_unavailable, ApiResult};

/// Resolves the fixed processing stages plus every discovered rule
/// processor against the live workload inventory. Answers 503 when no
/// inventory source is configured, 502 when the lookup fails.
pub async fn pipeline_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TopologyView>> {
    let inventory = state
        .inventory
        .clone()
        .ok_or_else(|| service_unavailable("workload inventory not configured"))?;

    let instances = inventory
        .list_workload_instances()
        .await
        .map_err(upstream_unavailable)?;

    Ok(Json(topology::resolve(&instances)))
}
