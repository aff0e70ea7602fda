//! Error types for the posting-rights engine

use thiserror::Error;

/// Posting-rights errors
#[derive(Debug, Error)]
pub enum RightsError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for posting-rights operations
pub type Result<T> = std::result::Result<T, RightsError>;
