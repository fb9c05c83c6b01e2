//! Transaction submission endpoints.
//!
//! Two entry shapes: a simplified request the gateway expands into the full
//! pacs.008 + pacs.002 pair, and a raw passthrough for callers that build
//! their own pacs.002. Pipeline failures are reported in the response body
//! with `success: false` rather than a 5xx — a down pipeline is a normal
//! operational condition, not a gateway fault.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use fraudgate_core::iso20022::{self, SimpleTransactionRequest};

use crate::state::AppState;
use crate::tms::TmsError;

use super::{bad_request, ApiResult, ErrorResponse};

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub msg_id: Option<String>,
    pub end_to_end_id: Option<String>,
    pub tenant_id: String,
    /// Pipeline's answer to the pacs.002, when the submission went through.
    #[schema(value_type = Object)]
    pub pipeline_response: Option<Value>,
    pub error: Option<String>,
}

fn tms_failure(tenant_id: String, e: &TmsError) -> SubmitResponse {
    SubmitResponse {
        success: false,
        msg_id: None,
        end_to_end_id: None,
        tenant_id,
        pipeline_response: None,
        error: Some(e.to_string()),
    }
}

/// Submit a simplified transaction
///
/// Expands the request into a pacs.008/pacs.002 pair sharing one
/// EndToEndId, forwards both to the evaluation pipeline in order, and
/// returns the pacs.002 message ID for later result lookup.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/evaluate",
    tag = "Submit",
    responses(
        (status = 200, description = "Submission outcome (check `success`)", body = SubmitResponse)
    )
)]
pub async fn evaluate_simple(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimpleTransactionRequest>,
) -> Json<SubmitResponse> {
    let tenant_id = req.resolved_tenant(&state.config.pipeline.default_tenant_id);
    let end_to_end_id = Uuid::new_v4().simple().to_string();

    let pacs008 = iso20022::build_pacs008(&req, &end_to_end_id);
    if let Err(e) = state
        .tms
        .forward(&pacs008.payload, &tenant_id, "pacs.008.001.10")
        .await
    {
        warn!("pacs.008 submission failed: {}", e);
        return Json(tms_failure(tenant_id, &e));
    }

    let pacs002 = iso20022::build_pacs002(&req, &end_to_end_id);
    match state
        .tms
        .forward(&pacs002.payload, &tenant_id, "pacs.002.001.12")
        .await
    {
        Ok(pipeline_response) => {
            info!(
                "Transaction submitted (MsgId: {}, tenant: {})",
                pacs002.msg_id, tenant_id
            );
            Json(SubmitResponse {
                success: true,
                msg_id: Some(pacs002.msg_id),
                end_to_end_id: Some(end_to_end_id),
                tenant_id,
                pipeline_response: Some(pipeline_response),
                error: None,
            })
        }
        Err(e) => {
            warn!("pacs.002 submission failed: {}", e);
            Json(tms_failure(tenant_id, &e))
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RawSubmitRequest {
    /// Complete pacs.002.001.12 payload.
    #[schema(value_type = Object)]
    pub payload: Value,
    pub tenant_id: Option<String>,
}

/// Submit a raw pacs.002 payload
///
/// Forwards the payload as-is. Rejected up front when the payload carries
/// no GrpHdr MsgId, since the result would be unqueryable.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/evaluate/raw",
    tag = "Submit",
    responses(
        (status = 200, description = "Submission outcome (check `success`)", body = SubmitResponse),
        (status = 400, description = "Payload missing GrpHdr MsgId", body = ErrorResponse)
    )
)]
pub async fn evaluate_raw(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RawSubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let msg_id = iso20022::pacs002_msg_id(&req.payload)
        .ok_or_else(|| bad_request("payload has no FIToFIPmtSts.GrpHdr.MsgId"))?
        .to_string();

    let tenant_id = req
        .tenant_id
        .unwrap_or_else(|| state.config.pipeline.default_tenant_id.clone());

    match state
        .tms
        .forward(&req.payload, &tenant_id, "pacs.002.001.12")
        .await
    {
        Ok(pipeline_response) => Ok(Json(SubmitResponse {
            success: true,
            msg_id: Some(msg_id),
            end_to_end_id: None,
            tenant_id,
            pipeline_response: Some(pipeline_response),
            error: None,
        })),
        Err(e) => {
            warn!("Raw pacs.002 submission failed: {}", e);
            Ok(Json(tms_failure(tenant_id, &e)))
        }
    }
}
