use shared::config::ConfigError;
use shared::{RejectReason, SubmitError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service at {0} reports its model is not loaded")]
    ModelNotLoaded(String),
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}
