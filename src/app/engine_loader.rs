// Engine loader - Fetches and initializes the engine exactly once

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::errors::DomainError;
use crate::ports::{EngineLoaderPort, EnginePort};

/// Reference to the loaded engine
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<dyn EnginePort>,
    ready: bool,
}

impl EngineHandle {
    /// Handle to an engine whose load step has not run
    pub fn unloaded(engine: Arc<dyn EnginePort>) -> Self {
        Self {
            engine,
            ready: false,
        }
    }

    pub(crate) fn loaded(engine: Arc<dyn EnginePort>) -> Self {
        Self {
            engine,
            ready: true,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn engine(&self) -> &Arc<dyn EnginePort> {
        &self.engine
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("ready", &self.ready)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoaderStatus {
    Idle,
    Pending,
    Loaded,
    Failed,
}

/// Runs the fetch-then-load sequence for one engine source
pub struct EngineLoader {
    port: Arc<dyn EngineLoaderPort>,
    source: String,
    status: LoaderStatus,
}

impl EngineLoader {
    pub fn new(port: Arc<dyn EngineLoaderPort>, source: impl Into<String>) -> Self {
        Self {
            port,
            source: source.into(),
            status: LoaderStatus::Idle,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fetch the engine and run its load step. Only the first call does any work;
    /// later calls are refused whatever the first outcome was.
    pub async fn initialize(&mut self) -> Result<EngineHandle, DomainError> {
        if self.status != LoaderStatus::Idle {
            return Err(DomainError::InvalidTransition(format!(
                "Engine initialization already attempted ({:?})",
                self.status
            )));
        }
        self.status = LoaderStatus::Pending;
        info!(source = %self.source, "Loading engine");

        match self.fetch_and_load().await {
            Ok(handle) => {
                self.status = LoaderStatus::Loaded;
                info!(source = %self.source, "Engine loaded");
                Ok(handle)
            }
            Err(e) => {
                self.status = LoaderStatus::Failed;
                error!(source = %self.source, "Error loading engine: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_and_load(&self) -> Result<EngineHandle, DomainError> {
        let engine = self.port.fetch(&self.source).await.map_err(as_load_error)?;
        engine.load().await.map_err(as_load_error)?;
        Ok(EngineHandle::loaded(engine))
    }
}

fn as_load_error(e: DomainError) -> DomainError {
    match e {
        DomainError::EngineLoad(msg) => DomainError::EngineLoad(msg),
        other => DomainError::EngineLoad(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_engine::{MockEngine, MockEngineLoader};

    #[tokio::test]
    async fn test_initialize_yields_ready_handle() {
        let engine = Arc::new(MockEngine::new());
        let port = Arc::new(MockEngineLoader::new(Arc::clone(&engine)));
        let mut loader = EngineLoader::new(port, "mock://engine");

        let handle = loader.initialize().await.unwrap();
        assert!(handle.is_ready());
        assert!(engine.is_loaded());
    }

    #[tokio::test]
    async fn test_initialize_only_once() {
        let engine = Arc::new(MockEngine::new());
        let port = Arc::new(MockEngineLoader::new(engine));
        let mut loader = EngineLoader::new(port, "mock://engine");

        loader.initialize().await.unwrap();
        assert!(matches!(
            loader.initialize().await,
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_engine_load_error() {
        let engine = Arc::new(MockEngine::new());
        let port = Arc::new(MockEngineLoader::failing(engine));
        let mut loader = EngineLoader::new(port, "mock://unreachable");

        assert!(matches!(
            loader.initialize().await,
            Err(DomainError::EngineLoad(_))
        ));
        // no retry
        assert!(matches!(
            loader.initialize().await,
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_load_step_failure_is_engine_load_error() {
        let engine = Arc::new(MockEngine::new().with_failing_load());
        let port = Arc::new(MockEngineLoader::new(Arc::clone(&engine)));
        let mut loader = EngineLoader::new(port, "mock://engine");

        assert!(matches!(
            loader.initialize().await,
            Err(DomainError::EngineLoad(_))
        ));
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_unloaded_handle_not_ready() {
        let handle = EngineHandle::unloaded(Arc::new(MockEngine::new()));
        assert!(!handle.is_ready());
    }
}
