//! Error types shared across the AMS workspace

use thiserror::Error;

/// Result type alias for AMS operations
pub type Result<T> = std::result::Result<T, AmsError>;

/// Main error type for AMS
#[derive(Error, Debug)]
pub enum AmsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
