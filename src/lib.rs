//! vtrim video trimmer library
//!
//! Loads an external video engine, takes a user's video, lets a time range be
//! chosen against a preview and produces a stream-copied clip of that range.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, WorkflowController, WorkflowSettings};
pub use domain::errors::DomainError;
pub use domain::model::{Artifact, SelectedFile, TrimRange, TrimResult, WorkflowPhase};
pub use error::{TrimmerError, TrimmerResult};
