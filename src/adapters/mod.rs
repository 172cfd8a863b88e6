// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_select;
pub mod mock_engine;
pub mod preview_headless;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::{FfmpegEngine, FfmpegEngineLoader};
pub use fs_select::select_file;
pub use mock_engine::{MockEngine, MockEngineLoader, MockProbe};
pub use preview_headless::HeadlessPreview;
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{TomlConfigAdapter, TrimmerConfig};
