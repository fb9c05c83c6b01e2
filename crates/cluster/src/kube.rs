//! Minimal Kubernetes REST client for the pipeline namespace.
//!
//! Talks straight to the API server over HTTPS with the pod's
//! service-account token. Only the handful of resources the dashboard
//! needs are modeled; everything else in the API responses is ignored.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use fraudgate_core::config::ClusterConfig;

use crate::inventory::{InventorySource, WorkloadInstance};

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("cluster unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cluster API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<ClusterError> for fraudgate_core::GatewayError {
    fn from(e: ClusterError) -> Self {
        fraudgate_core::GatewayError::Upstream(e.to_string())
    }
}

// ── Wire shapes (subset of the Kubernetes API) ────────────────────

#[derive(Debug, Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    name: String,
    creation_timestamp: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: PodSpec,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodSpec {
    node_name: Option<String>,
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    name: String,
    #[serde(default)]
    image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodStatus {
    phase: Option<String>,
    pod_ip: Option<String>,
    #[serde(default)]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    restart_count: i64,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: DeploymentSpec,
    #[serde(default)]
    status: DeploymentStatus,
}

#[derive(Debug, Default, Deserialize)]
struct DeploymentSpec {
    #[serde(default)]
    replicas: i32,
    template: Option<PodTemplate>,
}

#[derive(Debug, Deserialize)]
struct PodTemplate {
    #[serde(default)]
    spec: PodSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentStatus {
    #[serde(default)]
    ready_replicas: i32,
    #[serde(default)]
    available_replicas: i32,
    #[serde(default)]
    updated_replicas: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(rename = "type")]
    kind: Option<String>,
    reason: Option<String>,
    message: Option<String>,
    #[serde(default)]
    count: i64,
    first_timestamp: Option<String>,
    last_timestamp: Option<String>,
    #[serde(default)]
    involved_object: InvolvedObject,
    source: Option<EventSource>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
struct InvolvedObject {
    kind: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventSource {
    component: Option<String>,
}

// ── Dashboard views ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PodView {
    pub name: String,
    pub phase: String,
    pub ready: String,
    pub restarts: i64,
    pub node: Option<String>,
    pub ip: Option<String>,
    pub created_at: Option<String>,
    pub labels: HashMap<String, String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentView {
    pub name: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub updated_replicas: i32,
    pub images: Vec<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub object_kind: Option<String>,
    pub object_name: Option<String>,
    pub count: i64,
    pub first_time: Option<String>,
    pub last_time: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PodLogs {
    pub pod: String,
    pub container: Option<String>,
    pub tail_lines: u32,
    pub log_lines: Vec<String>,
    pub total_lines: usize,
}

// ── Client ────────────────────────────────────────────────────────

pub struct KubeClient {
    http: reqwest::Client,
    base_url: String,
    pub namespace: String,
    token: Option<String>,
}

impl KubeClient {
    /// Build the client from config, reading the service-account token if
    /// one is present at the configured path.
    pub fn from_config(config: &ClusterConfig) -> Result<Self, ClusterError> {
        let token = match std::fs::read_to_string(&config.token_path) {
            Ok(t) => Some(t.trim().to_string()),
            Err(_) => {
                warn!(
                    "No service-account token at {} — cluster requests will be unauthenticated",
                    config.token_path
                );
                None
            }
        };

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(Duration::from_secs(15))
            .build()?;

        info!(
            "Cluster client ready (api: {}, namespace: {})",
            config.api_url, config.namespace
        );

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            token,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClusterError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(ClusterError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ── Pods ──────────────────────────────────────────────────────

    pub async fn list_pods(&self) -> Result<Vec<PodView>, ClusterError> {
        let path = format!("/api/v1/namespaces/{}/pods", self.namespace);
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let list: ObjectList<Pod> = Self::check(resp).await?.json().await?;
        Ok(list.items.into_iter().map(pod_view).collect())
    }

    pub async fn pod_logs(
        &self,
        pod: &str,
        container: Option<&str>,
        tail_lines: u32,
        previous: bool,
    ) -> Result<PodLogs, ClusterError> {
        let path = format!("/api/v1/namespaces/{}/pods/{}/log", self.namespace, pod);
        let mut req = self.request(reqwest::Method::GET, &path).query(&[
            ("tailLines", tail_lines.to_string()),
            ("previous", previous.to_string()),
            ("timestamps", "true".to_string()),
        ]);
        if let Some(c) = container {
            req = req.query(&[("container", c)]);
        }
        let text = Self::check(req.send().await?).await?.text().await?;
        let log_lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.lines().map(str::to_string).collect()
        };
        Ok(PodLogs {
            pod: pod.to_string(),
            container: container.map(str::to_string),
            tail_lines,
            total_lines: log_lines.len(),
            log_lines,
        })
    }

    /// Delete a pod so its controller recreates it.
    pub async fn delete_pod(&self, pod: &str) -> Result<(), ClusterError> {
        let path = format!("/api/v1/namespaces/{}/pods/{}", self.namespace, pod);
        Self::check(self.request(reqwest::Method::DELETE, &path).send().await?).await?;
        info!("Pod {} deleted (restart) in namespace {}", pod, self.namespace);
        Ok(())
    }

    // ── Deployments ───────────────────────────────────────────────

    pub async fn list_deployments(&self) -> Result<Vec<DeploymentView>, ClusterError> {
        let path = format!("/apis/apps/v1/namespaces/{}/deployments", self.namespace);
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let list: ObjectList<Deployment> = Self::check(resp).await?.json().await?;
        Ok(list.items.into_iter().map(deployment_view).collect())
    }

    pub async fn scale_deployment(&self, name: &str, replicas: i32) -> Result<(), ClusterError> {
        let path = format!(
            "/apis/apps/v1/namespaces/{}/deployments/{}/scale",
            self.namespace, name
        );
        let body = json!({ "spec": { "replicas": replicas } });
        let resp = self
            .request(reqwest::Method::PATCH, &path)
            .header("Content-Type", "application/merge-patch+json")
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        info!("Deployment {} scaled to {} replicas", name, replicas);
        Ok(())
    }

    /// Rolling restart via the conventional restartedAt template annotation.
    pub async fn restart_deployment(&self, name: &str) -> Result<(), ClusterError> {
        let path = format!(
            "/apis/apps/v1/namespaces/{}/deployments/{}",
            self.namespace, name
        );
        let now = chrono::Utc::now().to_rfc3339();
        let body = json!({
            "spec": { "template": { "metadata": { "annotations": {
                "fraudgate/restartedAt": now,
            } } } }
        });
        let resp = self
            .request(reqwest::Method::PATCH, &path)
            .header("Content-Type", "application/merge-patch+json")
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        info!("Deployment {} rolling restart triggered", name);
        Ok(())
    }

    // ── Events ────────────────────────────────────────────────────

    /// Recent namespace events, most recent first.
    pub async fn list_events(&self, limit: usize) -> Result<Vec<EventView>, ClusterError> {
        let path = format!("/api/v1/namespaces/{}/events", self.namespace);
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let list: ObjectList<Event> = Self::check(resp).await?.json().await?;

        let mut events = list.items;
        events.sort_by(|a, b| {
            let key = |e: &Event| {
                e.last_timestamp
                    .clone()
                    .or_else(|| e.metadata.creation_timestamp.clone())
                    .unwrap_or_default()
            };
            key(b).cmp(&key(a))
        });

        Ok(events
            .into_iter()
            .take(limit)
            .map(|e| EventView {
                kind: e.kind,
                reason: e.reason,
                message: e.message,
                object_kind: e.involved_object.kind,
                object_name: e.involved_object.name,
                count: e.count,
                first_time: e.first_timestamp,
                last_time: e.last_timestamp,
                source: e.source.and_then(|s| s.component),
            })
            .collect())
    }
}

#[async_trait]
impl InventorySource for KubeClient {
    async fn list_workload_instances(&self) -> Result<Vec<WorkloadInstance>, ClusterError> {
        let pods = self.list_pods().await?;
        Ok(pods
            .into_iter()
            .map(|p| WorkloadInstance {
                name: p.name,
                phase: p.phase,
                ready: p.ready,
                restarts: p.restarts,
                node: p.node,
                ip: p.ip,
                created_at: p.created_at,
                labels: p.labels,
            })
            .collect())
    }
}

// ── View mapping ──────────────────────────────────────────────────

fn pod_view(pod: Pod) -> PodView {
    let ready_count = pod.status.container_statuses.iter().filter(|c| c.ready).count();
    let total_count = pod.spec.containers.len().max(pod.status.container_statuses.len());
    let restarts = pod
        .status
        .container_statuses
        .iter()
        .map(|c| c.restart_count)
        .sum();

    PodView {
        name: pod.metadata.name,
        phase: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
        ready: format!("{}/{}", ready_count, total_count),
        restarts,
        node: pod.spec.node_name,
        ip: pod.status.pod_ip,
        created_at: pod.metadata.creation_timestamp,
        labels: pod.metadata.labels,
        images: pod.spec.containers.into_iter().map(|c| c.image).collect(),
    }
}

fn deployment_view(d: Deployment) -> DeploymentView {
    DeploymentView {
        name: d.metadata.name,
        replicas: d.spec.replicas,
        ready_replicas: d.status.ready_replicas,
        available_replicas: d.status.available_replicas,
        updated_replicas: d.status.updated_replicas,
        images: d
            .spec
            .template
            .map(|t| t.spec.containers.into_iter().map(|c| c.image).collect())
            .unwrap_or_default(),
        created_at: d.metadata.creation_timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_view_aggregates_readiness_and_restarts() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": { "name": "rule-901-abc", "creationTimestamp": "2025-01-01T00:00:00Z" },
            "spec": {
                "nodeName": "node-1",
                "containers": [
                    { "name": "main", "image": "tazama/rule:1.0" },
                    { "name": "sidecar", "image": "envoy:1.28" }
                ]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.0.0.5",
                "containerStatuses": [
                    { "ready": true, "restartCount": 2 },
                    { "ready": false, "restartCount": 1 }
                ]
            }
        }))
        .unwrap();

        let view = pod_view(pod);
        assert_eq!(view.ready, "1/2");
        assert_eq!(view.restarts, 3);
        assert_eq!(view.phase, "Running");
        assert_eq!(view.images.len(), 2);
    }

    #[test]
    fn missing_status_defaults_to_unknown_phase() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": { "name": "p" }
        }))
        .unwrap();
        let view = pod_view(pod);
        assert_eq!(view.phase, "Unknown");
        assert_eq!(view.ready, "0/0");
    }

    #[test]
    fn deployment_view_pulls_template_images() {
        let d: Deployment = serde_json::from_value(json!({
            "metadata": { "name": "typology-processor" },
            "spec": {
                "replicas": 2,
                "template": { "spec": { "containers": [ { "name": "tp", "image": "tazama/tp:2" } ] } }
            },
            "status": { "readyReplicas": 2, "availableReplicas": 2, "updatedReplicas": 2 }
        }))
        .unwrap();
        let view = deployment_view(d);
        assert_eq!(view.replicas, 2);
        assert_eq!(view.images, vec!["tazama/tp:2"]);
    }
}
