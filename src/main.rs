//! VidSqueeze CLI
//!
//! Squeezes a video under a target file size with a two-pass encode.
//!
//! # Usage
//!
//! ```bash
//! vidsqueeze compress 25 "holiday.mov"
//! vidsqueeze compress 8.5 clip.mp4 --output small.mp4 --overwrite
//! vidsqueeze inspect clip.mp4 --target 50 --json
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use vidsqueeze_cli::adapters::init_logging;
use vidsqueeze_cli::cli::{self, Cli};
use vidsqueeze_cli::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the VidSqueeze CLI application
#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    let (config, source) = match initialize_configuration_hierarchy(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(&config.logging.level, config.logging.json) {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }
    match source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using built-in configuration"),
    }

    // Execute the requested command
    match cli::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(cli::exit_code_for(&e))
        }
    }
}
