// Workflow controller - Owns all workflow state and sequences the steps

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::engine_loader::{EngineHandle, EngineLoader};
use crate::app::file_intake::{FileIntake, DEFAULT_MAX_SIZE_BYTES};
use crate::app::locators::LocatorStore;
use crate::app::range_selector::RangeSelector;
use crate::app::trim_operation::TrimOperation;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{RangePolicy, OUTPUT_FILE_NAME, OUTPUT_MEDIA_TYPE};
use crate::ports::{PreviewPort, ProbePort};

/// Tunables for the workflow components
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub max_size_bytes: u64,
    pub range_step: f64,
    pub output_name: String,
    pub output_media_type: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            range_step: 1.0,
            output_name: OUTPUT_FILE_NAME.to_string(),
            output_media_type: OUTPUT_MEDIA_TYPE.to_string(),
        }
    }
}

/// A trim detached from the controller so it can run while the controller
/// keeps reporting the Trimming phase.
pub struct TrimJob {
    operation: TrimOperation,
    engine: EngineHandle,
    source: SourceVideo,
    range: TrimRange,
    locators: LocatorStore,
}

impl TrimJob {
    pub fn range(&self) -> TrimRange {
        self.range
    }

    pub async fn run(self) -> Result<TrimResult, DomainError> {
        self.operation
            .trim(&self.engine, &self.source, &self.range, &self.locators)
            .await
    }
}

/// Top-level state owner: engine loading, intake, range selection, trimming
/// and result delivery.
pub struct WorkflowController {
    state: WorkflowState,
    loader: EngineLoader,
    engine: Option<EngineHandle>,
    intake: FileIntake,
    selector: RangeSelector,
    operation: TrimOperation,
    preview: Box<dyn PreviewPort>,
    locators: LocatorStore,
    source: Option<SourceVideo>,
    range: Option<TrimRange>,
    result: Option<TrimResult>,
    is_trimming: bool,
}

impl WorkflowController {
    pub fn new(
        loader: EngineLoader,
        preview: Box<dyn PreviewPort>,
        settings: WorkflowSettings,
    ) -> Result<Self, DomainError> {
        let policy = RangePolicy::new(settings.range_step)?;
        Ok(Self {
            state: WorkflowState::initial(),
            loader,
            engine: None,
            intake: FileIntake::new(settings.max_size_bytes),
            selector: RangeSelector::new(policy),
            operation: TrimOperation::new(settings.output_name, settings.output_media_type),
            preview,
            locators: LocatorStore::new(),
            source: None,
            range: None,
            result: None,
            is_trimming: false,
        })
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn engine(&self) -> Option<&EngineHandle> {
        self.engine.as_ref()
    }

    pub fn source(&self) -> Option<&SourceVideo> {
        self.source.as_ref()
    }

    pub fn range(&self) -> Option<TrimRange> {
        self.range
    }

    pub fn result(&self) -> Option<&TrimResult> {
        self.result.as_ref()
    }

    pub fn is_trimming(&self) -> bool {
        self.is_trimming
    }

    pub fn playback(&self) -> PlaybackState {
        self.preview.state()
    }

    pub fn position(&self) -> f64 {
        self.preview.position()
    }

    pub fn locators(&self) -> &LocatorStore {
        &self.locators
    }

    /// Dereference a live locator
    pub fn resolve(&self, locator: &Locator) -> Result<Arc<[u8]>, DomainError> {
        self.locators.resolve(locator)
    }

    /// `(start / end)` for the current range, if any
    pub fn status_line(&self) -> Option<String> {
        self.range.map(|range| range.to_string())
    }

    /// EngineLoading -> AwaitingFile. A failure leaves the workflow in
    /// EngineLoading for good.
    pub async fn load_engine(&mut self) -> Result<(), DomainError> {
        self.expect_phase(WorkflowPhase::EngineLoading, "load the engine")?;

        match self.loader.initialize().await {
            Ok(handle) => {
                self.engine = Some(handle);
                self.transition(WorkflowPhase::AwaitingFile);
                self.state.last_error = None;
                Ok(())
            }
            Err(DomainError::InvalidTransition(msg)) => Err(DomainError::InvalidTransition(msg)),
            Err(e) => {
                self.record(&e);
                Err(e)
            }
        }
    }

    /// Accept a new file, superseding any previous one
    pub fn select_file(&mut self, file: SelectedFile) -> Result<&SourceVideo, DomainError> {
        match self.state.phase {
            WorkflowPhase::AwaitingFile | WorkflowPhase::Previewing => {}
            WorkflowPhase::Trimming => return Err(busy()),
            phase => {
                return Err(DomainError::InvalidTransition(format!(
                    "Cannot select a file while {}",
                    phase
                )))
            }
        }

        let source = match self.intake.accept(file, &self.locators) {
            Ok(source) => source,
            Err(e) => {
                self.record(&e);
                return Err(e);
            }
        };

        self.release_source();
        self.source = Some(source);
        self.state.last_error = None;
        self.transition(WorkflowPhase::Previewing);
        self.source
            .as_ref()
            .ok_or_else(|| DomainError::Precondition("No video selected".to_string()))
    }

    /// Preview reported the source duration
    pub fn metadata_resolved(&mut self, duration: f64) -> Result<TrimRange, DomainError> {
        self.expect_phase(WorkflowPhase::Previewing, "resolve metadata")?;
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| DomainError::Precondition("No video selected".to_string()))?;

        let outcome =
            self.selector
                .on_metadata_resolved(source, &mut self.range, self.preview.as_mut(), duration);
        self.settle(outcome)
    }

    /// Probe the current source and feed the duration to the range selector
    pub async fn resolve_metadata(&mut self, probe: &dyn ProbePort) -> Result<TrimRange, DomainError> {
        self.expect_phase(WorkflowPhase::Previewing, "resolve metadata")?;
        let file = self
            .source
            .as_ref()
            .map(|source| source.file.clone())
            .ok_or_else(|| DomainError::Precondition("No video selected".to_string()))?;

        match probe.probe_duration(&file).await {
            Ok(duration) => self.metadata_resolved(duration),
            Err(e) => {
                self.record(&e);
                Err(e)
            }
        }
    }

    /// User moved the range thumbs
    pub fn change_range(&mut self, requested: [f64; 2]) -> Result<TrimRange, DomainError> {
        self.expect_phase(WorkflowPhase::Previewing, "change the range")?;
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| DomainError::Precondition("No video selected".to_string()))?;

        let outcome =
            self.selector
                .on_range_changed(source, &mut self.range, self.preview.as_mut(), requested);
        self.settle(outcome)
    }

    /// Play or pause the preview
    pub fn toggle_play(&mut self) -> Result<PlaybackState, DomainError> {
        self.expect_phase(WorkflowPhase::Previewing, "toggle playback")?;
        let outcome = self.selector.on_play_toggle(self.preview.as_mut());
        self.settle(outcome)
    }

    /// Previewing -> Trimming. The returned job must be handed back through
    /// `finish_trim`.
    pub fn begin_trim(&mut self) -> Result<TrimJob, DomainError> {
        if self.is_trimming {
            return Err(busy());
        }
        self.expect_phase(WorkflowPhase::Previewing, "trim")?;

        let job = match self.prepare_job() {
            Ok(job) => job,
            Err(e) => {
                self.record(&e);
                return Err(e);
            }
        };

        if self.preview.state().is_playing() {
            if let Err(e) = self.preview.pause() {
                warn!("Failed to pause preview before trimming: {}", e);
            }
        }
        self.is_trimming = true;
        self.transition(WorkflowPhase::Trimming);
        Ok(job)
    }

    fn prepare_job(&self) -> Result<TrimJob, DomainError> {
        let engine = self
            .engine
            .clone()
            .ok_or_else(|| DomainError::Precondition("Engine is not loaded".to_string()))?;
        let source = self
            .source
            .clone()
            .ok_or_else(|| DomainError::Precondition("No video selected".to_string()))?;
        let range = self.range.ok_or_else(|| {
            DomainError::Precondition("Video duration is not known yet".to_string())
        })?;

        Ok(TrimJob {
            operation: self.operation.clone(),
            engine,
            source,
            range,
            locators: self.locators.clone(),
        })
    }

    /// Trimming -> ResultReady on success, back to Previewing on failure
    pub fn finish_trim(
        &mut self,
        outcome: Result<TrimResult, DomainError>,
    ) -> Result<&TrimResult, DomainError> {
        if !self.is_trimming {
            if let Ok(result) = &outcome {
                self.locators.revoke(&result.output_locator);
            }
            return Err(DomainError::InvalidTransition(
                "No trim in progress".to_string(),
            ));
        }
        self.is_trimming = false;

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.state.last_error = None;
                self.transition(WorkflowPhase::ResultReady);
                self.result
                    .as_ref()
                    .ok_or_else(|| DomainError::Trim("Trim result missing".to_string()))
            }
            Err(e) => {
                self.record(&e);
                self.transition(WorkflowPhase::Previewing);
                Err(e)
            }
        }
    }

    /// Run a whole trim: begin, execute, finish
    pub async fn trim(&mut self) -> Result<&TrimResult, DomainError> {
        let job = self.begin_trim()?;
        let outcome = job.run().await;
        self.finish_trim(outcome)
    }

    /// Previewing -> AwaitingFile, releasing the source
    pub fn discard_file(&mut self) -> Result<(), DomainError> {
        self.expect_phase(WorkflowPhase::Previewing, "discard the file")?;
        self.release_source();
        self.state.last_error = None;
        self.transition(WorkflowPhase::AwaitingFile);
        Ok(())
    }

    /// ResultReady -> AwaitingFile, releasing the clip and the source
    pub fn go_back(&mut self) -> Result<(), DomainError> {
        self.expect_phase(WorkflowPhase::ResultReady, "go back")?;
        self.release_result();
        self.release_source();
        self.state.last_error = None;
        self.transition(WorkflowPhase::AwaitingFile);
        Ok(())
    }

    /// The produced clip as a downloadable artifact
    pub fn download(&self) -> Result<Artifact, DomainError> {
        self.expect_phase(WorkflowPhase::ResultReady, "download")?;
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| DomainError::Precondition("No trimmed video".to_string()))?;

        Ok(Artifact {
            file_name: result.file_name.clone(),
            media_type: result.media_type.clone(),
            bytes: self.locators.resolve(&result.output_locator)?,
        })
    }

    fn release_source(&mut self) {
        if let Some(source) = self.source.take() {
            self.locators.revoke(&source.preview_locator);
            debug!(name = %source.name(), "Released source video");
        }
        self.preview.detach();
        self.range = None;
    }

    fn release_result(&mut self) {
        if let Some(result) = self.result.take() {
            self.locators.revoke(&result.output_locator);
            debug!(output = %result.file_name, "Released trimmed video");
        }
    }

    fn expect_phase(&self, expected: WorkflowPhase, action: &str) -> Result<(), DomainError> {
        if self.state.phase == expected {
            return Ok(());
        }
        if self.state.phase == WorkflowPhase::Trimming {
            return Err(busy());
        }
        Err(DomainError::InvalidTransition(format!(
            "Cannot {} while {}",
            action, self.state.phase
        )))
    }

    /// Record failures, clear the error on success
    fn settle<T>(&mut self, outcome: Result<T, DomainError>) -> Result<T, DomainError> {
        match &outcome {
            Ok(_) => self.state.last_error = None,
            Err(e) => self.record(e),
        }
        outcome
    }

    fn record(&mut self, e: &DomainError) {
        self.state.last_error = Some(e.user_message());
    }

    fn transition(&mut self, next: WorkflowPhase) {
        if self.state.phase != next {
            info!(from = %self.state.phase, to = %next, "Workflow transition");
        }
        self.state.phase = next;
    }
}

fn busy() -> DomainError {
    DomainError::Busy("A trim is already in progress".to_string())
}
