//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::{TomlConfigAdapter, TrimmerConfig};
use crate::cli::Cli;
use crate::error::{TrimmerError, TrimmerResult};

/// Files searched, in order, when no config path is given
const CONFIG_SEARCH_PATHS: [&str; 2] = ["vtrim.toml", "config/vtrim.toml"];

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> TrimmerResult<TrimmerConfig> {
    let base_dir = std::env::current_dir()?;
    resolve_configuration(cli, &base_dir, |key| std::env::var(key).ok())
}

/// Assemble the configuration with an injectable environment
pub fn resolve_configuration<F>(cli: &Cli, base_dir: &Path, env: F) -> TrimmerResult<TrimmerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let adapter = TomlConfigAdapter::new();

    let mut config = match config_file(cli, base_dir)? {
        Some(path) => adapter.load(&path)?,
        None => {
            debug!("No configuration file found, using defaults");
            TrimmerConfig::default()
        }
    };

    let env_overrides = apply_environment(&mut config, env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_overrides(&mut config, cli)?;
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    adapter.validate(&config)?;
    Ok(config)
}

/// An explicit path must exist; otherwise the first search path that does
fn config_file(cli: &Cli, base_dir: &Path) -> TrimmerResult<Option<PathBuf>> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(TrimmerError::ConfigError {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }
        return Ok(Some(path.clone()));
    }

    Ok(CONFIG_SEARCH_PATHS
        .iter()
        .map(|candidate| base_dir.join(candidate))
        .find(|candidate| candidate.is_file()))
}

fn apply_environment<F>(config: &mut TrimmerConfig, env: F) -> TrimmerResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(program) = env("VTRIM_ENGINE") {
        config.engine.program = program;
        applied += 1;
    }
    if let Some(program) = env("VTRIM_PROBE") {
        config.engine.probe_program = program;
        applied += 1;
    }
    if let Some(level) = env("VTRIM_LOG_LEVEL") {
        config.logging.level = level.parse()?;
        applied += 1;
    }
    if let Some(format) = env("VTRIM_LOG_FORMAT") {
        config.logging.format = format.parse()?;
        applied += 1;
    }
    if let Some(step) = env("VTRIM_RANGE_STEP") {
        config.range.step = step.trim().parse().map_err(|_| TrimmerError::ConfigError {
            message: format!("Invalid VTRIM_RANGE_STEP: {}", step),
        })?;
        applied += 1;
    }

    Ok(applied)
}

fn apply_cli_overrides(config: &mut TrimmerConfig, cli: &Cli) -> TrimmerResult<usize> {
    let mut applied = 0;

    if let Some(program) = &cli.engine {
        config.engine.program = program.clone();
        applied += 1;
    }
    if let Some(program) = &cli.probe {
        config.engine.probe_program = program.clone();
        applied += 1;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse()?;
        applied += 1;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse()?;
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::{LogFormat, LogLevel};
    use clap::Parser;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["vtrim"];
        argv.extend_from_slice(args);
        argv.push("session");
        Cli::try_parse_from(argv).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_configuration(&cli(&[]), dir.path(), env(&[])).unwrap();
        assert_eq!(config, TrimmerConfig::default());
    }

    #[test]
    fn test_file_then_env_then_cli() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vtrim.toml"),
            "[engine]\nprogram = \"file-ffmpeg\"\nprobe_program = \"file-ffprobe\"\n\n[range]\nstep = 0.5\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let from_file = resolve_configuration(&cli(&[]), dir.path(), env(&[])).unwrap();
        assert_eq!(from_file.engine.program, "file-ffmpeg");
        assert_eq!(from_file.range.step, 0.5);
        assert_eq!(from_file.logging.level, LogLevel::Warn);

        let with_env = resolve_configuration(
            &cli(&[]),
            dir.path(),
            env(&[("VTRIM_ENGINE", "env-ffmpeg"), ("VTRIM_LOG_FORMAT", "json")]),
        )
        .unwrap();
        assert_eq!(with_env.engine.program, "env-ffmpeg");
        assert_eq!(with_env.engine.probe_program, "file-ffprobe");
        assert_eq!(with_env.logging.format, LogFormat::Json);

        let with_cli = resolve_configuration(
            &cli(&["--engine", "cli-ffmpeg", "--log-level", "trace"]),
            dir.path(),
            env(&[("VTRIM_ENGINE", "env-ffmpeg"), ("VTRIM_LOG_LEVEL", "error")]),
        )
        .unwrap();
        assert_eq!(with_cli.engine.program, "cli-ffmpeg");
        assert_eq!(with_cli.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_nested_search_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config").join("vtrim.toml"),
            "[output]\noverwrite = true\n",
        )
        .unwrap();

        let config = resolve_configuration(&cli(&[]), dir.path(), env(&[])).unwrap();
        assert!(config.output.overwrite);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = cli(&["--config", missing.to_str().unwrap()]);

        assert!(matches!(
            resolve_configuration(&cli, dir.path(), env(&[])),
            Err(TrimmerError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_configuration(&cli(&[]), dir.path(), env(&[("VTRIM_RANGE_STEP", "fast")]))
            .is_err());
        assert!(resolve_configuration(&cli(&[]), dir.path(), env(&[("VTRIM_RANGE_STEP", "0")]))
            .is_err());
        assert!(resolve_configuration(&cli(&[]), dir.path(), env(&[("VTRIM_LOG_LEVEL", "loud")]))
            .is_err());
    }
}
