//! Command implementations

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::adapters::{select_file, FfprobeAdapter, TrimmerConfig};
use crate::app::{AppContainer, FileIntake, LocatorStore};
use crate::cli::args::{InspectArgs, TrimArgs};
use crate::domain::errors::DomainError;
use crate::output::DownloadWriter;
use crate::ports::ProbePort;
use crate::utils::format_file_size;
use crate::utils::time::{format_clock, TimeParser};

/// Execute the trim command
pub async fn trim(args: TrimArgs, config: &TrimmerConfig) -> Result<()> {
    let mut container = AppContainer::from_config(config)?;
    let writer = DownloadWriter::new(args.force || config.output.overwrite);
    let mut stdout = std::io::stdout();
    run_trim(&mut container, &writer, &args, &mut stdout).await?;
    Ok(())
}

/// Load, open, range, trim and save in one pass
pub async fn run_trim<W: Write>(
    container: &mut AppContainer,
    writer: &DownloadWriter,
    args: &TrimArgs,
    out: &mut W,
) -> Result<PathBuf> {
    info!("Input: {}", args.input.display());

    container
        .controller_mut()
        .load_engine()
        .await
        .context("Failed to load the video engine")?;

    let file = select_file(&args.input)
        .await
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let full = container
        .open(file)
        .await
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    if args.start.is_some() || args.end.is_some() {
        let parser = TimeParser::new();
        let start = match &args.start {
            Some(time) => parser
                .parse_time(time)
                .with_context(|| format!("Invalid start time '{}'", time))?,
            None => full.start,
        };
        let end = match &args.end {
            Some(time) => parser
                .parse_time(time)
                .with_context(|| format!("Invalid end time '{}'", time))?,
            None => full.end,
        };
        if start > end {
            bail!("Start time must not be after end time");
        }
        container.controller_mut().change_range([start, end])?;
    }

    let controller = container.controller_mut();
    let (range, size) = {
        let result = controller.trim().await.context("Failed to trim the video")?;
        (result.range, result.size)
    };
    writeln!(
        out,
        "Trimmed {} {} ({})",
        controller
            .source()
            .map(|source| source.name())
            .unwrap_or_default(),
        range,
        format_file_size(size)
    )?;

    let artifact = controller.download()?;
    let dest = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = writer.write(&artifact, &dest)?;
    writeln!(out, "Saved {}", path.display())?;
    Ok(path)
}

/// What `inspect` reports about a file
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub duration: f64,
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, config: &TrimmerConfig) -> Result<()> {
    let intake = FileIntake::new(config.intake.max_size_bytes);
    let probe = FfprobeAdapter::new(config.engine.probe_program.clone());
    let report = inspect_file(&args.input, &intake, &probe).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize inspect report to JSON")?;
        println!("{}", json);
    } else {
        display_report(&report, &mut std::io::stdout())?;
    }
    Ok(())
}

/// Run intake and probing for one file without touching the engine
pub async fn inspect_file(
    path: &Path,
    intake: &FileIntake,
    probe: &dyn ProbePort,
) -> Result<InspectReport> {
    let file = select_file(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let source = intake
        .accept(file, &LocatorStore::new())
        .with_context(|| format!("Cannot use {}", path.display()))?;
    let duration = probe
        .probe_duration(&source.file)
        .await
        .context("Failed to read video duration")?;

    Ok(InspectReport {
        name: source.file.name.clone(),
        media_type: source.file.media_type.clone(),
        size: source.file.size(),
        duration,
    })
}

fn display_report<W: Write>(report: &InspectReport, out: &mut W) -> Result<()> {
    writeln!(out, "File: {}", report.name)?;
    writeln!(out, "Media type: {}", report.media_type)?;
    writeln!(out, "Size: {}", format_file_size(report.size))?;
    writeln!(
        out,
        "Duration: {} ({:.3}s)",
        format_clock(report.duration),
        report.duration
    )?;
    Ok(())
}

/// A line of session input
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Open(PathBuf),
    Range(String, String),
    Play,
    Trim,
    Save(Option<PathBuf>),
    Back,
    Discard,
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "open" if !rest.is_empty() => Ok(SessionCommand::Open(PathBuf::from(rest))),
            "open" => Err(DomainError::BadArgs("usage: open <path>".to_string())),
            "range" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(start), Some(end), None) => {
                        Ok(SessionCommand::Range(start.to_string(), end.to_string()))
                    }
                    _ => Err(DomainError::BadArgs("usage: range <start> <end>".to_string())),
                }
            }
            "play" | "pause" => Ok(SessionCommand::Play),
            "trim" => Ok(SessionCommand::Trim),
            "save" if rest.is_empty() => Ok(SessionCommand::Save(None)),
            "save" => Ok(SessionCommand::Save(Some(PathBuf::from(rest)))),
            "back" => Ok(SessionCommand::Back),
            "discard" => Ok(SessionCommand::Discard),
            "status" => Ok(SessionCommand::Status),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(DomainError::BadArgs(format!(
                "Unknown command: {} (try `help`)",
                other
            ))),
        }
    }
}

const SESSION_HELP: &str = "\
Commands:
  open <path>          select a video
  range <start> <end>  set the trim range (seconds, MM:SS or HH:MM:SS)
  play                 toggle preview playback
  trim                 cut the selected range
  save [path]          save the clip (default: current directory)
  back                 drop the clip and start over
  discard              drop the selected video
  status               show the current state
  quit                 leave the session";

/// Execute the session command on stdin/stdout
pub async fn session(config: &TrimmerConfig) -> Result<()> {
    let mut container = AppContainer::from_config(config)?;
    let writer = DownloadWriter::new(config.output.overwrite);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(&mut container, &writer, stdin, &mut stdout).await
}

/// Drive the workflow from line-based input until `quit` or end of input
pub async fn run_session<R, W>(
    container: &mut AppContainer,
    writer: &DownloadWriter,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match container.controller_mut().load_engine().await {
        Ok(()) => writeln!(out, "Engine ready. Type `help` for commands.")?,
        Err(e) => writeln!(out, "{}", e.user_message())?,
    }
    out.flush()?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match SessionCommand::parse(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(container, writer, command, out).await {
                    writeln!(out, "error: {:#}", e)?;
                }
            }
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        out.flush()?;
    }
    Ok(())
}

async fn execute<W: Write>(
    container: &mut AppContainer,
    writer: &DownloadWriter,
    command: SessionCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        SessionCommand::Open(path) => {
            let file = select_file(&path).await?;
            container.open(file).await?;
            print_range(container, out)?;
        }
        SessionCommand::Range(start, end) => {
            let parser = TimeParser::new();
            let start = parser.parse_time(&start)?;
            let end = parser.parse_time(&end)?;
            container.controller_mut().change_range([start, end])?;
            print_range(container, out)?;
        }
        SessionCommand::Play => {
            let state = container.controller_mut().toggle_play()?;
            let position = container.controller().position();
            let label = if state.is_playing() { "playing" } else { "paused" };
            writeln!(out, "{} at {}", label, format_clock(position))?;
        }
        SessionCommand::Trim => {
            let result = container.controller_mut().trim().await?;
            writeln!(
                out,
                "Trimmed {} into {} ({})",
                result.range,
                result.file_name,
                format_file_size(result.size)
            )?;
        }
        SessionCommand::Save(dest) => {
            let artifact = container.controller().download()?;
            let dest = dest.unwrap_or_else(|| PathBuf::from("."));
            let path = writer.write(&artifact, &dest)?;
            writeln!(out, "Saved {}", path.display())?;
        }
        SessionCommand::Back => {
            container.controller_mut().go_back()?;
            writeln!(out, "Ready for a new video")?;
        }
        SessionCommand::Discard => {
            container.controller_mut().discard_file()?;
            writeln!(out, "Ready for a new video")?;
        }
        SessionCommand::Status => print_status(container, out)?,
        SessionCommand::Help => writeln!(out, "{}", SESSION_HELP)?,
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn print_range<W: Write>(container: &AppContainer, out: &mut W) -> Result<()> {
    if let Some(line) = container.controller().status_line() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn print_status<W: Write>(container: &AppContainer, out: &mut W) -> Result<()> {
    let controller = container.controller();
    writeln!(out, "phase: {}", controller.phase())?;
    if let Some(source) = controller.source() {
        writeln!(
            out,
            "file: {} ({}, {})",
            source.name(),
            source.file.media_type,
            format_file_size(source.file.size())
        )?;
    }
    if let Some(line) = controller.status_line() {
        writeln!(out, "range: {}", line)?;
    }
    if let Some(result) = controller.result() {
        writeln!(out, "clip: {} ({})", result.file_name, format_file_size(result.size))?;
    }
    if let Some(error) = controller.last_error() {
        writeln!(out, "last error: {}", error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HeadlessPreview, MockEngine, MockEngineLoader, MockProbe};
    use crate::app::WorkflowSettings;
    use std::sync::Arc;

    fn container(engine: Arc<MockEngine>, duration: f64) -> AppContainer {
        AppContainer::with_adapters(
            Arc::new(MockEngineLoader::new(engine)),
            "mock://engine",
            Box::new(HeadlessPreview::new()),
            Arc::new(MockProbe::new(duration)),
            WorkflowSettings::default(),
        )
        .unwrap()
    }

    fn video(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"fake-video-bytes").unwrap();
        path
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            SessionCommand::parse("open /tmp/my clip.mp4").unwrap(),
            SessionCommand::Open(PathBuf::from("/tmp/my clip.mp4"))
        );
        assert_eq!(
            SessionCommand::parse("range 0:02 7").unwrap(),
            SessionCommand::Range("0:02".to_string(), "7".to_string())
        );
        assert_eq!(SessionCommand::parse("  SAVE ").unwrap(), SessionCommand::Save(None));
        assert_eq!(SessionCommand::parse("exit").unwrap(), SessionCommand::Quit);
        assert!(SessionCommand::parse("open").is_err());
        assert!(SessionCommand::parse("range 1").is_err());
        assert!(SessionCommand::parse("rewind").is_err());
    }

    #[tokio::test]
    async fn test_run_trim_saves_clip() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(MockEngine::new());
        let mut container = container(Arc::clone(&engine), 10.0);
        let args = TrimArgs {
            input: video(dir.path(), "clip.mp4"),
            start: Some("2".to_string()),
            end: Some("00:07".to_string()),
            output: Some(dir.path().to_path_buf()),
            force: false,
        };

        let mut out = Vec::new();
        let path = run_trim(&mut container, &DownloadWriter::default(), &args, &mut out)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("output.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake-video-bytes");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(00:02 / 00:07)"));
        assert!(engine.commands()[0].contains(&"00:00:07.000".to_string()));
    }

    #[tokio::test]
    async fn test_run_trim_rejects_reversed_times() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = container(Arc::new(MockEngine::new()), 10.0);
        let args = TrimArgs {
            input: video(dir.path(), "clip.mp4"),
            start: Some("8".to_string()),
            end: Some("3".to_string()),
            output: Some(dir.path().to_path_buf()),
            force: false,
        };

        let mut out = Vec::new();
        assert!(run_trim(&mut container, &DownloadWriter::default(), &args, &mut out)
            .await
            .is_err());
        assert!(!dir.path().join("output.mp4").exists());
    }

    #[tokio::test]
    async fn test_inspect_rejects_non_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = inspect_file(&path, &FileIntake::default(), &MockProbe::new(1.0))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not a video"));
    }

    #[tokio::test]
    async fn test_inspect_reports_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = video(dir.path(), "clip.webm");

        let report = inspect_file(&path, &FileIntake::default(), &MockProbe::new(75.0))
            .await
            .unwrap();
        assert_eq!(report.media_type, "video/webm");
        assert_eq!(report.duration, 75.0);

        let mut out = Vec::new();
        display_report(&report, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Duration: 01:15"));
    }

    #[tokio::test]
    async fn test_session_full_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = video(dir.path(), "clip.mp4");
        let saves = dir.path().join("saves");
        std::fs::create_dir(&saves).unwrap();
        let mut container = container(Arc::new(MockEngine::new()), 10.0);

        let script = format!(
            "open {}\nrange 2 7\nplay\ntrim\nsave {}\nstatus\nback\nstatus\nquit\nstatus\n",
            path.display(),
            saves.display()
        );
        let mut out = Vec::new();
        run_session(&mut container, &DownloadWriter::default(), script.as_bytes(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Engine ready"));
        assert!(text.contains("(00:00 / 00:10)"));
        assert!(text.contains("(00:02 / 00:07)"));
        assert!(text.contains("playing at 00:02"));
        assert!(text.contains("phase: result ready"));
        assert!(text.contains("phase: awaiting file"));
        assert!(saves.join("output.mp4").exists());
        // nothing after quit runs
        assert_eq!(text.matches("phase:").count(), 2);
        assert_eq!(container.controller().locators().live_count(), 0);
    }

    #[tokio::test]
    async fn test_session_reports_errors_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();
        let mut container = container(Arc::new(MockEngine::new()), 10.0);

        let script = format!("trim\nopen {}\nfrobnicate\nstatus\n", notes.display());
        let mut out = Vec::new();
        run_session(&mut container, &DownloadWriter::default(), script.as_bytes(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error: Invalid transition"));
        assert!(text.contains("not a video"));
        assert!(text.contains("Unknown command: frobnicate"));
        assert!(text.contains("phase: awaiting file"));
    }

    #[tokio::test]
    async fn test_session_with_failed_engine() {
        let engine = Arc::new(MockEngine::new().with_failing_load());
        let mut container = container(engine, 10.0);

        let mut out = Vec::new();
        run_session(&mut container, &DownloadWriter::default(), &b"status\n"[..], &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Failed to load the video engine."));
        assert!(text.contains("phase: engine loading"));
    }
}
