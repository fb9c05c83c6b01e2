use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// True when the error should surface as a 404 rather than a 5xx.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}
