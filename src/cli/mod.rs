//! CLI module for vtrim
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// vtrim video trimmer
///
/// Cuts a time range out of a video with a stream-copy pass through ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "vtrim")]
#[command(about = "vtrim - Cut a time range out of a video without re-encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, env = "VTRIM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Engine program
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Probe program used to read durations
    #[arg(long, global = true)]
    pub probe: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim a video in one pass and save the clip
    Trim(args::TrimArgs),
    /// Show what intake and probing report for a file
    Inspect(args::InspectArgs),
    /// Interactive trimming session on stdin
    Session,
}
