//! Error types for ngxclair

use thiserror::Error;

/// Result type for ngxclair operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ngxclair
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (parse or validation failure, already rendered)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
