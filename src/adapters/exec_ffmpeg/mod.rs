//! FFmpeg execution adapter
//!
//! Drives an ffmpeg executable as the trimming engine. The engine's working
//! store is a private temporary directory; every command runs inside it, so
//! argument lists only ever carry bare file names.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Arguments prepended to every engine command
const BASE_ARGS: [&str; 4] = ["-hide_banner", "-loglevel", "error", "-y"];

/// Resolves an ffmpeg program into an engine
#[derive(Debug, Default)]
pub struct FfmpegEngineLoader;

impl FfmpegEngineLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EngineLoaderPort for FfmpegEngineLoader {
    /// Check that `source` names a runnable ffmpeg
    async fn fetch(&self, source: &str) -> Result<Arc<dyn EnginePort>, DomainError> {
        let output = Command::new(source)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DomainError::EngineLoad(format!("Cannot run {}: {}", source, e)))?;

        if !output.status.success() {
            return Err(DomainError::EngineLoad(format!(
                "{} -version exited with {}",
                source, output.status
            )));
        }

        let banner = String::from_utf8_lossy(&output.stdout);
        if let Some(line) = banner.lines().next() {
            info!("Found engine: {}", line);
        }
        Ok(Arc::new(FfmpegEngine::new(source)))
    }
}

/// Engine backed by an ffmpeg process per command
#[derive(Debug)]
pub struct FfmpegEngine {
    program: String,
    workdir: OnceCell<TempDir>,
}

impl FfmpegEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            workdir: OnceCell::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn workdir(&self) -> Result<&Path, DomainError> {
        self.workdir
            .get()
            .map(|dir| dir.path())
            .ok_or_else(|| DomainError::Precondition("Engine is not loaded".to_string()))
    }

    /// Path of `name` inside the working store
    fn path_for(&self, name: &str) -> Result<PathBuf, DomainError> {
        validate_name(name)?;
        Ok(self.workdir()?.join(name))
    }
}

/// Engine file names are a single plain path component
fn validate_name(name: &str) -> Result<(), DomainError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(DomainError::BadArgs(format!("Invalid engine file name: {:?}", name))),
    }
}

#[async_trait]
impl EnginePort for FfmpegEngine {
    async fn load(&self) -> Result<(), DomainError> {
        let dir = self
            .workdir
            .get_or_try_init(|| async {
                tempfile::Builder::new()
                    .prefix("vtrim-engine-")
                    .tempdir()
                    .map_err(|e| {
                        DomainError::EngineLoad(format!("Failed to create working store: {}", e))
                    })
            })
            .await?;
        debug!(workdir = %dir.path().display(), "Engine working store ready");
        Ok(())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write {}: {}", name, e)))
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.path_for(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", name, e)))
    }

    async fn remove(&self, name: &str) -> Result<(), DomainError> {
        let path = self.path_for(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to remove {}: {}", name, e)))
    }

    async fn run(&self, args: &[String]) -> Result<(), DomainError> {
        let workdir = self.workdir()?;
        debug!(program = %self.program, ?args, "Spawning engine");

        let output = Command::new(&self.program)
            .args(BASE_ARGS)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DomainError::Trim(format!("Cannot run {}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        Err(DomainError::Trim(if detail.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            format!("{} exited with {}: {}", self.program, output.status, detail)
        }))
    }

    async fn fetch_payload(&self, file: &SelectedFile) -> Result<Vec<u8>, DomainError> {
        Ok(file.payload.to_vec())
    }
}
