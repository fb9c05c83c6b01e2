//! Evaluation-result query endpoints: paginated list, single-record
//! investigation view, and aggregate statistics.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fraudgate_core::classify::{self, Classification};
use fraudgate_core::format;
use fraudgate_core::stats::{self, StatsSummary, StatsView};
use fraudgate_core::view::{ViewState, DEFAULT_PER_PAGE};
use fraudgate_store::{is_valid_status_tag, EvaluationRow};

use crate::state::AppState;

use super::{bad_request, not_found, require_store, upstream_unavailable, ApiResult, ErrorResponse};

// ── Query params ────────────────────────────────────────────────

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResultsQuery {
    /// Override tenant ID (defaults to the server setting).
    pub tenant_id: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size; the store clamps to 1–100.
    pub per_page: Option<u32>,
    /// Filter by wire status tag, ALRT or NALT.
    pub status: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TenantQuery {
    pub tenant_id: Option<String>,
}

// ── Response types ──────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultRowView {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub row: EvaluationRow,
    /// Count of typology passes, regardless of wire shape.
    pub typology_count: usize,
    /// Human-unit processing time, e.g. "2.5 ms".
    pub processing_time: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultListResponse {
    pub tenant_id: String,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub results: Vec<ResultRowView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultDetailResponse {
    pub tenant_id: String,
    pub msg_id: String,
    #[schema(value_type = Object)]
    pub classification: Classification,
    #[schema(value_type = Object)]
    pub evaluation: Value,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub tenant_id: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub summary: StatsSummary,
    #[schema(value_type = Object)]
    pub derived: StatsView,
}

// ── Handlers ────────────────────────────────────────────────────

fn resolved_tenant(state: &AppState, tenant_id: Option<String>) -> String {
    tenant_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| state.config.pipeline.default_tenant_id.clone())
}

/// List evaluation results
///
/// Paginated evaluations for a tenant, newest first. Navigating past the
/// last page returns an empty result set, not an error.
#[utoipa::path(
    get,
    path = "/api/v1/results",
    tag = "Results",
    params(ResultsQuery),
    responses(
        (status = 200, description = "One page of evaluations", body = ResultListResponse),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
        (status = 502, description = "Result store failure", body = ErrorResponse)
    )
)]
pub async fn list_results(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResultsQuery>,
) -> ApiResult<Json<ResultListResponse>> {
    let store = require_store(&state)?;

    if let Some(tag) = params.status.as_deref() {
        if !is_valid_status_tag(tag) {
            return Err(bad_request(format!(
                "invalid status filter '{}' (expected ALRT or NALT)",
                tag
            )));
        }
    }

    let mut view = ViewState::new(resolved_tenant(&state, params.tenant_id));
    view.page = params.page.unwrap_or(1).max(1);
    view.per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
    view.status_filter = params.status;

    let page = store
        .list_results(
            &view.tenant_id,
            view.page,
            view.per_page,
            view.status_filter.as_deref(),
        )
        .await
        .map_err(upstream_unavailable)?;

    let results = page.results.into_iter().map(row_view).collect();

    Ok(Json(ResultListResponse {
        tenant_id: view.tenant_id,
        total: page.total,
        page: view.page,
        per_page: view.per_page,
        results,
    }))
}

fn row_view(row: EvaluationRow) -> ResultRowView {
    let typology_count = row
        .typology_results
        .as_ref()
        .map(classify::typology_count)
        .unwrap_or(0);
    let processing_time = row
        .processing_time_ns
        .as_deref()
        .map(|s| format::format_duration_opt(&Value::String(s.to_string())))
        .unwrap_or_else(|| "—".to_string());
    ResultRowView {
        row,
        typology_count,
        processing_time,
    }
}

/// Get one evaluation by message ID
///
/// Returns the stored evaluation together with its classified breakdown.
#[utoipa::path(
    get,
    path = "/api/v1/results/{msg_id}",
    tag = "Results",
    params(
        ("msg_id" = String, Path, description = "Transaction message ID"),
        TenantQuery,
    ),
    responses(
        (status = 200, description = "Classified evaluation", body = ResultDetailResponse),
        (status = 404, description = "No evaluation for this message ID", body = ErrorResponse),
        (status = 502, description = "Result store failure", body = ErrorResponse)
    )
)]
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(msg_id): Path<String>,
    Query(params): Query<TenantQuery>,
) -> ApiResult<Json<ResultDetailResponse>> {
    let store = require_store(&state)?;
    let tenant_id = resolved_tenant(&state, params.tenant_id);

    let evaluation = store
        .get_result(&tenant_id, &msg_id)
        .await
        .map_err(upstream_unavailable)?
        .ok_or_else(|| not_found(format!("no evaluation found for MsgId={}", msg_id)))?;

    let classification = classify::classify(&evaluation);

    Ok(Json(ResultDetailResponse {
        tenant_id,
        msg_id,
        classification,
        evaluation,
    }))
}

/// Evaluation statistics
///
/// Raw counters plus derived rates for the dashboard cards and outcome
/// chart.
#[utoipa::path(
    get,
    path = "/api/v1/results/stats/summary",
    tag = "Results",
    params(TenantQuery),
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 502, description = "Result store failure", body = ErrorResponse)
    )
)]
pub async fn stats_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TenantQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let store = require_store(&state)?;
    let tenant_id = resolved_tenant(&state, params.tenant_id);

    let summary = store
        .stats_summary(&tenant_id)
        .await
        .map_err(upstream_unavailable)?;
    let derived = stats::aggregate(&summary);

    Ok(Json(StatsResponse {
        tenant_id,
        summary,
        derived,
    }))
}
