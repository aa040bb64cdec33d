//! Error types for the herald system

use thiserror::Error;

/// Main error type for all herald operations
#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

/// Result type for herald operations
pub type Result<T> = std::result::Result<T, HeraldError>;
