//! CLI module for VidSqueeze
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::CompressorConfig;
use crate::error::CompressError;

pub mod args;
pub mod commands;

/// VidSqueeze
///
/// Squeezes a video under a target file size with a two-pass encode.
#[derive(Parser, Debug)]
#[command(name = "vidsqueeze")]
#[command(about = "VidSqueeze - Fit videos under a size limit with two-pass encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: vidsqueeze.toml, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, env = "VIDSQUEEZE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Encoder executable
    #[arg(long, env = "VIDSQUEEZE_ENCODER", global = true)]
    pub encoder: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a video to fit a target size
    Compress(args::CompressArgs),
    /// Show duration, audio bitrate and the planned bitrates for a file
    Inspect(args::InspectArgs),
}

/// Dispatch the parsed command
pub async fn run(cli: Cli, config: CompressorConfig) -> Result<()> {
    let verbose = matches!(config.logging.level.to_lowercase().as_str(), "debug" | "trace");
    match cli.command {
        Commands::Compress(args) => commands::compress(args, config, verbose).await,
        Commands::Inspect(args) => commands::inspect(args, config).await,
    }
}

/// Process exit code for a failed command
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<CompressError>() {
        Some(CompressError::Cancelled) => 130,
        Some(CompressError::ProcessSpawnFailed { .. }) => 127,
        Some(CompressError::InvalidTargetSize { .. }) | Some(CompressError::Config { .. }) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::try_parse_from([
            "vidsqueeze", "compress", "25", "my", "holiday", "clip.mp4", "--overwrite", "--progress", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Compress(args) => {
                assert_eq!(args.target, "25");
                assert_eq!(args.input_path(), PathBuf::from("my holiday clip.mp4"));
                assert!(args.overwrite);
                assert_eq!(args.progress, args::ProgressArg::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_inspect_with_globals() {
        let cli = Cli::try_parse_from([
            "vidsqueeze", "inspect", "a.mp4", "--target", "50", "--json", "--encoder", "/opt/ffmpeg",
        ])
        .unwrap();

        assert_eq!(cli.encoder.as_deref(), Some("/opt/ffmpeg"));
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.target.as_deref(), Some("50"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compress_requires_input() {
        assert!(Cli::try_parse_from(["vidsqueeze", "compress", "25"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let cancelled = anyhow::Error::new(CompressError::Cancelled).context("Failed to compress a.mp4");
        assert_eq!(exit_code_for(&cancelled), 130);

        let invalid = anyhow::Error::new(CompressError::InvalidTargetSize {
            value: "abc".to_string(),
        });
        assert_eq!(exit_code_for(&invalid), 2);

        let other = anyhow::anyhow!("boom");
        assert_eq!(exit_code_for(&other), 1);
    }
}
