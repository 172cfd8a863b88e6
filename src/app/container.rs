use std::sync::Arc;

use crate::adapters::{FfmpegEngineLoader, FfprobeAdapter, HeadlessPreview, TrimmerConfig};
use crate::app::engine_loader::EngineLoader;
use crate::app::workflow::{WorkflowController, WorkflowSettings};
use crate::domain::errors::DomainError;
use crate::domain::model::{SelectedFile, TrimRange};
use crate::ports::{EngineLoaderPort, PreviewPort, ProbePort};

impl From<&TrimmerConfig> for WorkflowSettings {
    fn from(config: &TrimmerConfig) -> Self {
        Self {
            max_size_bytes: config.intake.max_size_bytes,
            range_step: config.range.step,
            output_name: config.output.file_name.clone(),
            output_media_type: config.output.media_type.clone(),
        }
    }
}

/// Wires adapters into a workflow controller
pub struct AppContainer {
    controller: WorkflowController,
    probe: Arc<dyn ProbePort>,
}

impl AppContainer {
    /// Production wiring: ffmpeg engine, ffprobe probe, headless preview
    pub fn from_config(config: &TrimmerConfig) -> Result<Self, DomainError> {
        Self::with_adapters(
            Arc::new(FfmpegEngineLoader::new()),
            &config.engine.program,
            Box::new(HeadlessPreview::new()),
            Arc::new(FfprobeAdapter::new(config.engine.probe_program.clone())),
            WorkflowSettings::from(config),
        )
    }

    pub fn with_adapters(
        loader_port: Arc<dyn EngineLoaderPort>,
        engine_source: &str,
        preview: Box<dyn PreviewPort>,
        probe: Arc<dyn ProbePort>,
        settings: WorkflowSettings,
    ) -> Result<Self, DomainError> {
        let loader = EngineLoader::new(loader_port, engine_source);
        let controller = WorkflowController::new(loader, preview, settings)?;
        Ok(Self { controller, probe })
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WorkflowController {
        &mut self.controller
    }

    pub fn probe(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe)
    }

    /// Open `file`, resolving its duration through the probe
    pub async fn open(&mut self, file: SelectedFile) -> Result<TrimRange, DomainError> {
        self.controller.select_file(file)?;
        let probe = Arc::clone(&self.probe);
        self.controller.resolve_metadata(probe.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockEngine, MockEngineLoader, MockProbe};
    use crate::domain::model::WorkflowPhase;

    #[tokio::test]
    async fn test_open_resolves_duration() {
        let mut container = AppContainer::with_adapters(
            Arc::new(MockEngineLoader::new(Arc::new(MockEngine::new()))),
            "mock://engine",
            Box::new(HeadlessPreview::new()),
            Arc::new(MockProbe::new(8.0)),
            WorkflowSettings::default(),
        )
        .unwrap();
        container.controller_mut().load_engine().await.unwrap();

        let range = container
            .open(SelectedFile::new("clip.mp4", "video/mp4", vec![1, 2]))
            .await
            .unwrap();
        assert_eq!(range, TrimRange::full(8.0));
        assert_eq!(container.controller().phase(), WorkflowPhase::Previewing);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = TrimmerConfig::default();
        config.range.step = 0.25;
        config.output.file_name = "clip.mp4".to_string();

        let settings = WorkflowSettings::from(&config);
        assert_eq!(settings.range_step, 0.25);
        assert_eq!(settings.output_name, "clip.mp4");
        assert_eq!(settings.max_size_bytes, config.intake.max_size_bytes);
    }
}
