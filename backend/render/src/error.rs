use envforge_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
