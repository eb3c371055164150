//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::engine::ProgressMode;

/// Arguments for the compress command
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Target size: a preset (25, 50, 100) or a size in MB
    pub target: String,

    /// Input video file; unquoted paths with spaces are re-joined
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path (default: <input>_compressed.mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Progress display
    #[arg(long, value_enum, default_value_t = ProgressArg::Console)]
    pub progress: ProgressArg,
}

impl CompressArgs {
    pub fn input_path(&self) -> PathBuf {
        join_input(&self.input)
    }
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file; unquoted paths with spaces are re-joined
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Preview the plan for this target
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl InspectArgs {
    pub fn input_path(&self) -> PathBuf {
        join_input(&self.input)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressArg {
    /// Progress bar on stderr
    Console,
    /// JSON lines on stdout
    Json,
    /// No progress output
    None,
}

impl From<ProgressArg> for ProgressMode {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Console => ProgressMode::Console,
            ProgressArg::Json => ProgressMode::Json,
            ProgressArg::None => ProgressMode::None,
        }
    }
}

/// A launcher that does not quote the path splits it on spaces
fn join_input(parts: &[String]) -> PathBuf {
    PathBuf::from(parts.join(" "))
}
