// TOML config adapter - Configuration management using TOML files

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::file_intake::DEFAULT_MAX_SIZE_BYTES;
use crate::domain::rules::{OUTPUT_FILE_NAME, OUTPUT_MEDIA_TYPE};
use crate::error::{TrimmerError, TrimmerResult};
use crate::utils::logging::LoggingConfig;

/// Complete vtrim configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimmerConfig {
    pub engine: EngineConfig,
    pub intake: IntakeConfig,
    pub range: RangeConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// External programs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program used as the trimming engine
    pub program: String,
    /// Program used to read media duration
    pub probe_program: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            probe_program: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Suggested upper bound; larger files only produce a warning
    pub max_size_bytes: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Granularity range endpoints snap to, in seconds
    pub step: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self { step: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_name: String,
    pub media_type: String,
    /// Replace an existing file when saving
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: OUTPUT_FILE_NAME.to_string(),
            media_type: OUTPUT_MEDIA_TYPE.to_string(),
            overwrite: false,
        }
    }
}

/// TOML configuration adapter
#[derive(Debug, Default)]
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parse configuration text; missing keys take their defaults
    pub fn parse(&self, content: &str) -> TrimmerResult<TrimmerConfig> {
        toml::from_str(content).map_err(|e| TrimmerError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Load and parse a configuration file
    pub fn load(&self, path: &Path) -> TrimmerResult<TrimmerConfig> {
        if !path.exists() {
            return Err(TrimmerError::ConfigError {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TrimmerError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = self.parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write a configuration file, creating its directory
    pub fn save(&self, config: &TrimmerConfig, path: &Path) -> TrimmerResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| TrimmerError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the workflow cannot run with
    pub fn validate(&self, config: &TrimmerConfig) -> TrimmerResult<()> {
        if config.engine.program.trim().is_empty() {
            return Err(config_error("engine.program must not be empty"));
        }
        if config.engine.probe_program.trim().is_empty() {
            return Err(config_error("engine.probe_program must not be empty"));
        }
        if !config.range.step.is_finite() || config.range.step <= 0.0 {
            return Err(config_error(&format!(
                "range.step must be a positive number of seconds, got {}",
                config.range.step
            )));
        }
        if config.output.file_name.trim().is_empty() {
            return Err(config_error("output.file_name must not be empty"));
        }
        let mut components = Path::new(&config.output.file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(config_error(&format!(
                "output.file_name must be a bare file name, got {}",
                config.output.file_name
            )));
        }
        if config.output.media_type.trim().is_empty() {
            return Err(config_error("output.media_type must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> TrimmerError {
    TrimmerError::ConfigError {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::{LogFormat, LogLevel};

    #[test]
    fn test_defaults() {
        let config = TrimmerConfig::default();
        assert_eq!(config.engine.program, "ffmpeg");
        assert_eq!(config.engine.probe_program, "ffprobe");
        assert_eq!(config.intake.max_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.range.step, 1.0);
        assert_eq!(config.output.file_name, "output.mp4");
        assert!(!config.output.overwrite);
        assert!(TomlConfigAdapter::new().validate(&config).is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let adapter = TomlConfigAdapter::new();
        let config = adapter
            .parse("[engine]\nprogram = \"/opt/ffmpeg/bin/ffmpeg\"\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n")
            .unwrap();

        assert_eq!(config.engine.program, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.engine.probe_program, "ffprobe");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.range.step, 1.0);
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let adapter = TomlConfigAdapter::new();
        assert!(adapter.parse("[logging]\nlevel = \"loud\"\n").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let adapter = TomlConfigAdapter::new();

        let mut config = TrimmerConfig::default();
        config.range.step = 0.0;
        assert!(adapter.validate(&config).is_err());

        let mut config = TrimmerConfig::default();
        config.engine.program = "  ".to_string();
        assert!(adapter.validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_nested_output_name() {
        let adapter = TomlConfigAdapter::new();

        for name in ["clips/out.mp4", "../out.mp4", "/tmp/out.mp4", ".."] {
            let mut config = TrimmerConfig::default();
            config.output.file_name = name.to_string();
            assert!(adapter.validate(&config).is_err(), "{} accepted", name);
        }

        let mut config = TrimmerConfig::default();
        config.output.file_name = "clip-01.mp4".to_string();
        assert!(adapter.validate(&config).is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vtrim.toml");
        let adapter = TomlConfigAdapter::new();

        let mut config = TrimmerConfig::default();
        config.range.step = 0.5;
        config.output.overwrite = true;
        adapter.save(&config, &path).unwrap();

        assert_eq!(adapter.load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TomlConfigAdapter::new()
            .load(&dir.path().join("absent.toml"))
            .is_err());
    }
}
