//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "fraudgate API",
        version = "0.1.0",
        description = "Transaction submission gateway and operational dashboard for a fraud-detection evaluation pipeline.",
    ),
    tags(
        (name = "Health", description = "Service liveness and collaborator readiness"),
        (name = "Submit", description = "ISO 20022 transaction submission into the evaluation pipeline"),
        (name = "Results", description = "Evaluation result queries, classification, and statistics"),
    ),
    paths(
        crate::api::health::health,
        crate::api::submit::evaluate_simple,
        crate::api::submit::evaluate_raw,
        crate::api::results::list_results,
        crate::api::results::get_result,
        crate::api::results::stats_summary,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::submit::SubmitResponse,
        crate::api::submit::RawSubmitRequest,
        crate::api::results::ResultRowView,
        crate::api::results::ResultListResponse,
        crate::api::results::ResultDetailResponse,
        crate::api::results::StatsResponse,
    ))
)]
pub struct ApiDoc;
