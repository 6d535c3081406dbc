use thiserror::Error;

/// Top-level error type for environment resolution and structuring.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid key: {key} ({reason})")]
    InvalidKey { key: String, reason: String },

    #[error("error retrieving configuration for {source_name}: {message}")]
    Retrieval {
        source_name: String,
        message: String,
    },

    #[error("environment not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
