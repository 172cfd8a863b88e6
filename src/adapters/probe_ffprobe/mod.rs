//! FFprobe adapter for media duration probing
//!
//! Plays the part of a player's metadata event: the selected bytes are
//! spilled to a temporary file and ffprobe reports the container duration.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FfprobeAdapter {
    program: String,
}

impl FfprobeAdapter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Copy the payload into a temp file that keeps the source extension.
    /// The write goes through `tokio::fs` so a large payload does not stall the runtime.
    async fn spill(file: &SelectedFile) -> Result<tempfile::NamedTempFile, DomainError> {
        let suffix = Path::new(&file.name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix("vtrim-probe-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| DomainError::FsFail(format!("Failed to create probe file: {}", e)))?;
        tokio::fs::write(temp.path(), &file.payload)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write probe file: {}", e)))?;
        Ok(temp)
    }
}

/// Duration in seconds from `ffprobe -show_entries format=duration -of json`
pub fn parse_duration_json(json: &str) -> Result<f64, DomainError> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| DomainError::ProbeFail(format!("Unreadable ffprobe output: {}", e)))?;

    let raw = output
        .format
        .and_then(|format| format.duration)
        .ok_or_else(|| DomainError::ProbeFail("No duration reported".to_string()))?;

    match raw.trim().parse::<f64>() {
        Ok(duration) if duration.is_finite() && duration >= 0.0 => Ok(duration),
        _ => Err(DomainError::ProbeFail(format!("Unusable duration: {}", raw))),
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_duration(&self, file: &SelectedFile) -> Result<f64, DomainError> {
        let temp = Self::spill(file).await?;

        let output = Command::new(&self.program)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(temp.path())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DomainError::ProbeFail(format!("Cannot run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(DomainError::ProbeFail(format!(
                "{} failed on {}: {}",
                self.program,
                file.name,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration = parse_duration_json(&String::from_utf8_lossy(&output.stdout))?;
        debug!(name = %file.name, duration, "Probed duration");
        Ok(duration)
    }
}
