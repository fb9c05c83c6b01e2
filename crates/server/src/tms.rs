//! HTTP client for the external evaluation service (TMS).
//!
//! The gateway forwards fully built ISO 20022 payloads and returns whatever
//! the pipeline answers. Errors distinguish a reachable-but-unhappy service
//! (status + body) from a transport failure so the submit endpoints can
//! report each in-body without a 500.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use fraudgate_core::config::PipelineConfig;

#[derive(Error, Debug)]
pub enum TmsError {
    #[error("TMS returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot reach TMS at {base_url}: {detail}")]
    Transport { base_url: String, detail: String },
}

#[derive(Clone)]
pub struct TmsClient {
    http: reqwest::Client,
    base_url: String,
}

impl TmsClient {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tms_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.tms_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST an ISO 20022 payload for evaluation, e.g. msg_type
    /// "pacs.002.001.12".
    pub async fn forward(
        &self,
        payload: &Value,
        tenant_id: &str,
        msg_type: &str,
    ) -> Result<Value, TmsError> {
        let url = format!("{}/v1/evaluate/iso20022/{}", self.base_url, msg_type);
        info!("Forwarding {} to TMS for tenant {}", msg_type, tenant_id);

        let resp = self
            .http
            .post(&url)
            .header("x-tenant-id", tenant_id)
            .json(payload)
            .send()
            .await
            .map_err(|e| TmsError::Transport {
                base_url: self.base_url.clone(),
                detail: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json().await.map_err(|e| TmsError::Transport {
            base_url: self.base_url.clone(),
            detail: e.to_string(),
        })
    }
}
