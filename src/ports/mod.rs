// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the external video-processing engine.
///
/// The engine owns a private working store addressed by plain file names and
/// accepts a flat argument list in the style of the ffmpeg command line.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Engine's own initialization step, run once after fetching
    async fn load(&self) -> Result<(), DomainError>;

    /// Write bytes into the engine's working store
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError>;

    /// Read bytes back from the engine's working store
    async fn read(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Remove a file from the engine's working store
    async fn remove(&self, name: &str) -> Result<(), DomainError>;

    /// Execute a command against the working store
    async fn run(&self, args: &[String]) -> Result<(), DomainError>;

    /// Turn a user selection into bytes the engine can ingest
    async fn fetch_payload(&self, file: &SelectedFile) -> Result<Vec<u8>, DomainError>;
}

/// Port for obtaining an engine from its source
#[async_trait]
pub trait EngineLoaderPort: Send + Sync {
    /// Fetch the engine named by `source`. The returned engine is not yet loaded.
    async fn fetch(&self, source: &str) -> Result<Arc<dyn EnginePort>, DomainError>;
}

/// Port for media metadata
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the selected media in seconds
    async fn probe_duration(&self, file: &SelectedFile) -> Result<f64, DomainError>;
}

/// Port for the live preview element
pub trait PreviewPort: Send {
    /// Attach new media; resets position and pauses
    fn attach(&mut self, locator: &Locator, duration: f64) -> Result<(), DomainError>;

    /// Drop the attached media
    fn detach(&mut self);

    /// Move the playback position
    fn seek(&mut self, position: f64) -> Result<(), DomainError>;

    /// Start playback
    fn play(&mut self) -> Result<(), DomainError>;

    /// Pause playback
    fn pause(&mut self) -> Result<(), DomainError>;

    /// Actual playback state
    fn state(&self) -> PlaybackState;

    /// Current playback position in seconds
    fn position(&self) -> f64;
}
