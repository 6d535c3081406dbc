use thiserror::Error;

/// Failures raised by table-backed providers.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("property table {0} is unavailable")]
    Unavailable(String),
}
