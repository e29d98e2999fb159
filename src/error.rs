use thiserror::Error;

/// Status code monobank answers with when a client exceeds its request quota.
pub const TOO_MANY_REQUESTS: u16 = 249;

#[derive(Debug, Error)]
pub enum MonoError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("too many requests ({TOO_MANY_REQUESTS}): {0}")]
    RateLimitExceeded(String),

    #[error("api rejected request with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("scoped session requires an async runtime, use it from within tokio")]
    SyncUsage,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl MonoError {
    /// Raw response body for errors produced by the status classifier.
    pub fn body(&self) -> Option<&str> {
        match self {
            MonoError::RateLimitExceeded(body) | MonoError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MonoError::RateLimitExceeded(_))
    }
}
