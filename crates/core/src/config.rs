use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub eval_db: PgConfig,
    pub event_db: PgConfig,
    pub pipeline: PipelineConfig,
    pub cluster: ClusterConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            eval_db: PgConfig::from_env("EVAL_DB", "evaluation"),
            event_db: PgConfig::from_env("EVENT_DB", "event_history"),
            pipeline: PipelineConfig::from_env(),
            cluster: ClusterConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:    {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  eval db:   host={}, db={}",
            self.eval_db.host,
            self.eval_db.database
        );
        tracing::info!(
            "  event db:  host={}, db={}",
            self.event_db.host,
            self.event_db.database
        );
        tracing::info!(
            "  pipeline:  tms={}, tenant={}",
            self.pipeline.tms_base_url,
            self.pipeline.default_tenant_id
        );
        tracing::info!(
            "  cluster:   api={}, namespace={}",
            self.cluster.api_url,
            self.cluster.namespace
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "server": { "host": self.server.host, "port": self.server.port },
            "eval_db": { "host": self.eval_db.host, "database": self.eval_db.database },
            "event_db": { "host": self.event_db.host, "database": self.event_db.database },
            "pipeline": {
                "tms_base_url": self.pipeline.tms_base_url,
                "default_tenant_id": self.pipeline.default_tenant_id,
            },
            "cluster": {
                "api_url": self.cluster.api_url,
                "namespace": self.cluster.namespace,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 8100),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── PostgreSQL (evaluation / event history) ───────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PgConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl PgConfig {
    fn from_env(prefix: &str, default_db: &str) -> Self {
        Self {
            host: env_or(&format!("{prefix}_HOST"), "localhost"),
            port: env_u16(&format!("{prefix}_PORT"), 5432),
            database: env_or(&format!("{prefix}_NAME"), default_db),
            username: env_or(&format!("{prefix}_USER"), "postgres"),
            password: env_or(&format!("{prefix}_PASSWORD"), "postgres"),
            max_connections: env_u32(&format!("{prefix}_MAX_CONNECTIONS"), 5),
        }
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

// ── Pipeline (evaluation submission service) ──────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the TMS evaluation service.
    pub tms_base_url: String,
    /// Request timeout for TMS submissions, in seconds.
    pub tms_timeout_secs: u64,
    /// Tenant used when a request does not carry one.
    pub default_tenant_id: String,
}

impl PipelineConfig {
    fn from_env() -> Self {
        Self {
            tms_base_url: env_or("TMS_BASE_URL", "http://gateway:3000"),
            tms_timeout_secs: env_u64("TMS_TIMEOUT_SECS", 30),
            default_tenant_id: env_or("DEFAULT_TENANT_ID", "DEFAULT"),
        }
    }
}

// ── Cluster (orchestration API) ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Kubernetes API server base URL.
    pub api_url: String,
    /// Namespace holding the pipeline workloads.
    pub namespace: String,
    /// Service-account bearer token path (empty = no auth header).
    pub token_path: String,
    /// Verify the API server TLS certificate.
    pub verify_tls: bool,
}

impl ClusterConfig {
    fn from_env() -> Self {
        Self {
            api_url: env_or("K8S_API_URL", "https://kubernetes.default.svc"),
            namespace: env_or("K8S_NAMESPACE", "tazama"),
            token_path: env_or(
                "K8S_TOKEN_PATH",
                "/var/run/secrets/kubernetes.io/serviceaccount/token",
            ),
            verify_tls: env_or("K8S_VERIFY_TLS", "false") == "true",
        }
    }
}
