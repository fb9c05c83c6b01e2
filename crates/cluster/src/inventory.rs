//! Workload inventory seam.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::ClusterError;

/// One live workload instance (a pod) as reported by the orchestration API.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadInstance {
    pub name: String,
    /// Reported lifecycle phase, e.g. "Running", "Pending", "Failed".
    pub phase: String,
    /// "ready/total" container ratio.
    pub ready: String,
    pub restarts: i64,
    pub node: Option<String>,
    pub ip: Option<String>,
    pub created_at: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Read-only inventory listing, separated from the full `KubeClient` so the
/// topology endpoint can be tested without a cluster.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_workload_instances(&self) -> Result<Vec<WorkloadInstance>, ClusterError>;
}
