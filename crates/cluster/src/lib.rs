//! Orchestration-API boundary and pipeline topology resolution.
//!
//! The cluster control plane is an external collaborator: this crate calls
//! its REST API for workload inventory and operations (logs, restarts,
//! scaling) and derives the pipeline-health view from the inventory
//! snapshot. Nothing here is persisted; every view is recomputed per poll.

pub mod inventory;
pub mod kube;
pub mod topology;

pub use inventory::{InventorySource, WorkloadInstance};
pub use kube::{ClusterError, KubeClient};
pub use topology::{resolve, ComponentStatus, ComponentView, TopologyView};
