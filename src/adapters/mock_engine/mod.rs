// Mock engine adapter - In-memory engine, loader and probe doubles

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Engine that keeps its working store in a map and "trims" by copying the
/// input's bytes to the output name.
#[derive(Debug, Default)]
pub struct MockEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    commands: Mutex<Vec<Vec<String>>>,
    loaded: AtomicBool,
    fail_load: bool,
    fail_next_run: AtomicBool,
    calls: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the load step fail
    pub fn with_failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Make the next `run` fail without producing output
    pub fn fail_next_run(&self) {
        self.fail_next_run.store(true, Ordering::SeqCst);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Every argument list passed to `run`, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        lock(&self.commands).clone()
    }

    /// Names currently held in the working store
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.files).keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of store and command calls made after loading
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Input and output names of an ffmpeg-style argument list
fn io_names(args: &[String]) -> Option<(&str, &str)> {
    let input = args
        .iter()
        .position(|arg| arg == "-i")
        .and_then(|i| args.get(i + 1))?;
    let output = args.last()?;
    Some((input.as_str(), output.as_str()))
}

#[async_trait]
impl EnginePort for MockEngine {
    async fn load(&self) -> Result<(), DomainError> {
        if self.fail_load {
            return Err(DomainError::EngineLoad("mock engine refused to load".to_string()));
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        self.touch();
        lock(&self.files).insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.touch();
        lock(&self.files)
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::FsFail(format!("No such engine file: {}", name)))
    }

    async fn remove(&self, name: &str) -> Result<(), DomainError> {
        self.touch();
        lock(&self.files)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DomainError::FsFail(format!("No such engine file: {}", name)))
    }

    async fn run(&self, args: &[String]) -> Result<(), DomainError> {
        self.touch();
        lock(&self.commands).push(args.to_vec());
        debug!(?args, "Mock engine command");

        if self.fail_next_run.swap(false, Ordering::SeqCst) {
            return Err(DomainError::Trim("mock engine run failed".to_string()));
        }

        let (input, output) = io_names(args)
            .ok_or_else(|| DomainError::BadArgs("Missing input or output".to_string()))?;
        let mut files = lock(&self.files);
        let bytes = files
            .get(input)
            .cloned()
            .ok_or_else(|| DomainError::Trim(format!("{}: No such file or directory", input)))?;
        files.insert(output.to_string(), bytes);
        Ok(())
    }

    async fn fetch_payload(&self, file: &SelectedFile) -> Result<Vec<u8>, DomainError> {
        self.touch();
        Ok(file.payload.to_vec())
    }
}

/// Loader that hands out a shared `MockEngine`
pub struct MockEngineLoader {
    engine: Arc<MockEngine>,
    fail_fetch: bool,
}

impl MockEngineLoader {
    pub fn new(engine: Arc<MockEngine>) -> Self {
        Self {
            engine,
            fail_fetch: false,
        }
    }

    /// Loader whose fetch step fails, as for an unreachable source
    pub fn failing(engine: Arc<MockEngine>) -> Self {
        Self {
            engine,
            fail_fetch: true,
        }
    }
}

#[async_trait]
impl EngineLoaderPort for MockEngineLoader {
    async fn fetch(&self, source: &str) -> Result<Arc<dyn EnginePort>, DomainError> {
        if self.fail_fetch {
            return Err(DomainError::EngineLoad(format!("Could not fetch {}", source)));
        }
        Ok(Arc::clone(&self.engine) as Arc<dyn EnginePort>)
    }
}

/// Probe reporting a fixed duration
pub struct MockProbe {
    duration: Option<f64>,
}

impl MockProbe {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
        }
    }

    pub fn failing() -> Self {
        Self { duration: None }
    }
}

#[async_trait]
impl ProbePort for MockProbe {
    async fn probe_duration(&self, file: &SelectedFile) -> Result<f64, DomainError> {
        self.duration
            .ok_or_else(|| DomainError::ProbeFail(format!("No duration for {}", file.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_copies_input_to_output() {
        let engine = MockEngine::new();
        engine.write("in.mp4", b"abc").await.unwrap();
        engine
            .run(&args(&["-i", "in.mp4", "-ss", "00:00", "out.mp4"]))
            .await
            .unwrap();

        assert_eq!(engine.read("out.mp4").await.unwrap(), b"abc");
        assert_eq!(engine.stored_files(), vec!["in.mp4", "out.mp4"]);
        assert_eq!(engine.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_run_without_input_fails() {
        let engine = MockEngine::new();
        assert!(matches!(
            engine.run(&args(&["-i", "missing.mp4", "out.mp4"])).await,
            Err(DomainError::Trim(_))
        ));
    }

    #[tokio::test]
    async fn test_fail_next_run_is_one_shot() {
        let engine = MockEngine::new();
        engine.write("in.mp4", b"abc").await.unwrap();
        engine.fail_next_run();

        let cmd = args(&["-i", "in.mp4", "out.mp4"]);
        assert!(engine.run(&cmd).await.is_err());
        assert!(engine.run(&cmd).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_doubles() {
        let file = SelectedFile::new("clip.mp4", "video/mp4", vec![1]);
        assert_eq!(MockProbe::new(12.5).probe_duration(&file).await.unwrap(), 12.5);
        assert!(matches!(
            MockProbe::failing().probe_duration(&file).await,
            Err(DomainError::ProbeFail(_))
        ));
    }
}
