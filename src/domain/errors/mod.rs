// Domain errors - Error types for the workflow core

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Engine could not be fetched or its load step failed
    EngineLoad(String),
    /// Selected file was rejected by intake or range input was unusable
    Validation(String),
    /// Engine command or read-back failed during a trim
    Trim(String),
    /// Operation called without its preconditions holding
    Precondition(String),
    /// A trim is already in flight
    Busy(String),
    /// Operation not allowed in the current workflow phase
    InvalidTransition(String),
    /// Locator was released or never existed
    LocatorRevoked(String),
    /// Media metadata could not be determined
    ProbeFail(String),
    /// File system failure
    FsFail(String),
    /// Invalid arguments provided
    BadArgs(String),
}

impl DomainError {
    /// Message suitable for showing next to the action that failed
    pub fn user_message(&self) -> String {
        match self {
            DomainError::EngineLoad(_) => "Failed to load the video engine.".to_string(),
            DomainError::Trim(_) => "Failed to trim the video. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::EngineLoad(msg) => write!(f, "Engine load failed: {}", msg),
            DomainError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            DomainError::Trim(msg) => write!(f, "Trim failed: {}", msg),
            DomainError::Precondition(msg) => write!(f, "Precondition failed: {}", msg),
            DomainError::Busy(msg) => write!(f, "Busy: {}", msg),
            DomainError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            DomainError::LocatorRevoked(msg) => write!(f, "Locator revoked: {}", msg),
            DomainError::ProbeFail(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
