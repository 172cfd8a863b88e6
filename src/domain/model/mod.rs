// Domain models - Core types and data structures

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::utils::time::format_clock;

/// Dereferenceable reference to in-memory media content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Locator(String);

impl Locator {
    pub(crate) fn new(id: u64) -> Self {
        Self(format!("vtrim-blob:{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw user selection handed to file intake
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub payload: Arc<[u8]>,
}

impl SelectedFile {
    /// Create a selection from its name, media type and bytes
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: Arc::from(payload),
        }
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }
}

/// Accepted input video
#[derive(Debug, Clone)]
pub struct SourceVideo {
    pub file: SelectedFile,
    pub preview_locator: Locator,
    /// Unknown until the preview reports its metadata
    pub duration: Option<f64>,
}

impl SourceVideo {
    pub fn name(&self) -> &str {
        &self.file.name
    }
}

/// Selected interval of the source, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    /// Full range of a source of the given duration
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration,
        }
    }

    /// Create a range, checking `0 <= start <= end <= duration`
    pub fn new(start: f64, end: f64, duration: f64) -> Result<Self, DomainError> {
        let range = Self { start, end };
        range.validate_against_duration(duration)?;
        Ok(range)
    }

    /// Check the range invariant against a source duration
    pub fn validate_against_duration(&self, duration: f64) -> Result<(), DomainError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(DomainError::Validation(
                "Range bounds must be finite".to_string(),
            ));
        }
        if self.start < 0.0 {
            return Err(DomainError::Validation(format!(
                "Range start {} is before the beginning of the video",
                self.start
            )));
        }
        if self.start > self.end {
            return Err(DomainError::Validation(format!(
                "Range start {} is after range end {}",
                self.start, self.end
            )));
        }
        if self.end > duration {
            return Err(DomainError::Validation(format!(
                "Range end {} exceeds video duration {}",
                self.end, duration
            )));
        }
        Ok(())
    }

    /// Length of the range in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TrimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} / {})", format_clock(self.start), format_clock(self.end))
    }
}

/// Produced clip
#[derive(Debug, Clone, Serialize)]
pub struct TrimResult {
    pub output_locator: Locator,
    pub file_name: String,
    pub media_type: String,
    pub range: TrimRange,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Downloadable artifact handed to the host
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

/// Workflow phase tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowPhase {
    EngineLoading,
    AwaitingFile,
    Previewing,
    Trimming,
    ResultReady,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowPhase::EngineLoading => "engine loading",
            WorkflowPhase::AwaitingFile => "awaiting file",
            WorkflowPhase::Previewing => "previewing",
            WorkflowPhase::Trimming => "trimming",
            WorkflowPhase::ResultReady => "result ready",
        };
        f.write_str(name)
    }
}

/// Current phase plus the last error shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    pub phase: WorkflowPhase,
    pub last_error: Option<String>,
}

impl WorkflowState {
    pub fn initial() -> Self {
        Self {
            phase: WorkflowPhase::EngineLoading,
            last_error: None,
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Playback state as reported by the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}
