use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrawlerError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Content '{selector}' did not appear within {}s", timeout.as_secs_f64())]
    ContentTimeout { selector: String, timeout: Duration },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Failed to persist result to {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid task submission: {0}")]
    Precondition(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrawlerError>;
