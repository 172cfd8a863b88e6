// Trim operation - One stream-copy cut through the engine

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::app::engine_loader::EngineHandle;
use crate::app::locators::LocatorStore;
use crate::domain::errors::DomainError;
use crate::domain::model::{SourceVideo, TrimRange, TrimResult};
use crate::domain::rules::{TrimCommand, OUTPUT_FILE_NAME, OUTPUT_MEDIA_TYPE};

/// Drives the engine for a single trim
#[derive(Debug, Clone)]
pub struct TrimOperation {
    output_name: String,
    output_media_type: String,
}

impl Default for TrimOperation {
    fn default() -> Self {
        Self::new(OUTPUT_FILE_NAME, OUTPUT_MEDIA_TYPE)
    }
}

impl TrimOperation {
    pub fn new(output_name: impl Into<String>, output_media_type: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            output_media_type: output_media_type.into(),
        }
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Cut `range` out of `source` and register the clip under a new locator.
    ///
    /// Preconditions are checked before the engine is touched. Engine failures
    /// come back as `DomainError::Trim`.
    pub async fn trim(
        &self,
        engine: &EngineHandle,
        source: &SourceVideo,
        range: &TrimRange,
        locators: &LocatorStore,
    ) -> Result<TrimResult, DomainError> {
        self.check_preconditions(engine, source, range)?;

        let started = Instant::now();
        info!(name = %source.name(), %range, "Trimming video");

        let outcome = self.run_engine(engine, source, range).await;
        self.cleanup(engine, source).await;

        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Error trimming video: {}", e);
                return Err(e);
            }
        };

        let size = bytes.len() as u64;
        let output_locator = locators.create(Arc::from(bytes), &self.output_media_type);
        info!(
            output = %self.output_name,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Video trimming successful"
        );

        Ok(TrimResult {
            output_locator,
            file_name: self.output_name.clone(),
            media_type: self.output_media_type.clone(),
            range: *range,
            size,
            created_at: Utc::now(),
        })
    }

    fn check_preconditions(
        &self,
        engine: &EngineHandle,
        source: &SourceVideo,
        range: &TrimRange,
    ) -> Result<(), DomainError> {
        if !engine.is_ready() {
            return Err(DomainError::Precondition(
                "Engine is not loaded".to_string(),
            ));
        }
        let duration = source.duration.ok_or_else(|| {
            DomainError::Precondition("Video duration is not known yet".to_string())
        })?;
        range
            .validate_against_duration(duration)
            .map_err(|e| DomainError::Precondition(e.to_string()))?;
        if source.name() == self.output_name {
            return Err(DomainError::Precondition(format!(
                "Input name collides with output name {}",
                self.output_name
            )));
        }
        Ok(())
    }

    async fn run_engine(
        &self,
        engine: &EngineHandle,
        source: &SourceVideo,
        range: &TrimRange,
    ) -> Result<Vec<u8>, DomainError> {
        let engine = engine.engine();
        let input_name = source.name();

        let payload = engine.fetch_payload(&source.file).await.map_err(as_trim_error)?;
        engine.write(input_name, &payload).await.map_err(as_trim_error)?;

        let args = TrimCommand::build(input_name, range, &self.output_name);
        debug!(?args, "Running engine command");
        engine.run(&args).await.map_err(as_trim_error)?;

        let bytes = engine.read(&self.output_name).await.map_err(as_trim_error)?;
        if bytes.is_empty() {
            return Err(DomainError::Trim("Engine produced an empty clip".to_string()));
        }
        Ok(bytes)
    }

    /// Drop the working files so repeated trims don't pile up in the engine
    async fn cleanup(&self, engine: &EngineHandle, source: &SourceVideo) {
        for name in [source.name(), self.output_name.as_str()] {
            if let Err(e) = engine.engine().remove(name).await {
                warn!("Failed to remove engine file {}: {}", name, e);
            }
        }
    }
}

fn as_trim_error(e: DomainError) -> DomainError {
    match e {
        DomainError::Trim(msg) => DomainError::Trim(msg),
        other => DomainError::Trim(other.to_string()),
    }
}
