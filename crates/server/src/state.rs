use std::sync::Arc;

use fraudgate_cluster::{InventorySource, KubeClient};
use fraudgate_core::Config;
use fraudgate_store::ResultStore;

use crate::tms::TmsClient;

pub struct AppState {
    pub config: Config,
    /// Result store; `None` when the evaluation databases are unreachable
    /// at startup. Handlers answer 503 until it exists.
    pub store: Option<Arc<dyn ResultStore>>,
    /// Workload inventory for the pipeline-status view.
    pub inventory: Option<Arc<dyn InventorySource>>,
    /// Full cluster client for operational actions (logs, scale, restart).
    pub kube: Option<Arc<KubeClient>>,
    pub tms: TmsClient,
}
