//! Error handling module for vtrim

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for vtrim operations outside the workflow core
#[derive(Error, Debug)]
pub enum TrimmerError {
    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Logging subscriber could not be set up
    #[error("Failed to initialize logging: {message}")]
    LoggingError { message: String },

    /// Output file write error
    #[error("Failed to write output file: {message}")]
    OutputError { message: String },

    /// Workflow error surfaced to the outer layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for vtrim operations
pub type TrimmerResult<T> = std::result::Result<T, TrimmerError>;
