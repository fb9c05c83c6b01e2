//! Result-store adapter boundary.
//!
//! The fraud pipeline owns the evaluation and event-history databases; this
//! crate only consumes their contents. `ResultStore` is the seam the server
//! depends on, so tests can substitute an in-memory implementation.

pub mod pg;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use fraudgate_core::stats::StatsSummary;

pub use pg::PgResultStore;

/// Valid wire status filter tags.
pub const STATUS_TAGS: [&str; 2] = ["ALRT", "NALT"];

/// True when `tag` is a known status filter value.
pub fn is_valid_status_tag(tag: &str) -> bool {
    STATUS_TAGS.contains(&tag)
}

/// Clamp a requested page size to the adapter's 1–100 contract.
pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, 100)
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for fraudgate_core::GatewayError {
    fn from(e: StoreError) -> Self {
        fraudgate_core::GatewayError::Upstream(e.to_string())
    }
}

/// One evaluation as it appears in the paginated list view. Nested fields
/// stay raw JSON; classification happens above this layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EvaluationRow {
    pub msg_id: String,
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    pub evaluation_id: Option<String>,
    pub evaluated_at: Option<String>,
    /// Stringified nanoseconds (JSONB `->>` extraction yields text).
    pub processing_time_ns: Option<String>,
    pub typology_results: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultPage {
    pub results: Vec<EvaluationRow>,
    pub total: i64,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Paginated evaluations for a tenant, newest first. `status_filter`
    /// must already be a valid wire tag; callers validate before this point.
    async fn list_results(
        &self,
        tenant_id: &str,
        page: u32,
        per_page: u32,
        status_filter: Option<&str>,
    ) -> Result<ResultPage, StoreError>;

    /// Full stored evaluation JSON for one message id, or `None`.
    async fn get_result(&self, tenant_id: &str, msg_id: &str)
        -> Result<Option<Value>, StoreError>;

    /// Raw tenant-scoped counters.
    async fn stats_summary(&self, tenant_id: &str) -> Result<StatsSummary, StoreError>;
}
