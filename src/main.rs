//! vtrim
//!
//! Command-line video trimmer: pick a range, get a stream-copied clip.
//!
//! # Usage
//!
//! ```bash
//! vtrim trim --input holiday.mov --start 00:01:00 --end 00:02:00
//! vtrim inspect --input holiday.mov --json
//! vtrim session
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vtrim::cli::{commands, Cli, Commands};
use vtrim::config_initialization::initialize_configuration;
use vtrim::utils::logging::LoggingSystem;

/// Main entry point for the vtrim CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;

    let logging = LoggingSystem::new(config.logging.clone());
    logging.initialize()?;
    logging.log_system_info();

    match cli.command {
        Commands::Trim(args) => {
            info!("Executing trim command");
            commands::trim(args, &config).await?;
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args, &config).await?;
        }
        Commands::Session => {
            info!("Starting interactive session");
            commands::session(&config).await?;
        }
    }

    info!("vtrim completed successfully");
    Ok(())
}
