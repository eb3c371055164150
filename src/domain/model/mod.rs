// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CompressError, CompressResult};

#[cfg(test)]
mod tests;

/// Audio bitrate assumed when the encoder reports none
pub const DEFAULT_AUDIO_BITRATE_BPS: i64 = 128_000;

/// Bytes per megabyte used for all size targets
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Metadata extracted from the encoder's diagnostic output for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Duration in seconds, 0 when unknown
    pub duration_seconds: f64,
    /// Audio bitrate of the first audio stream, or the fallback
    pub audio_bitrate_bps: i64,
    /// Whether `audio_bitrate_bps` came from the file rather than the fallback
    pub audio_bitrate_detected: bool,
}

impl MediaProbe {
    pub fn new(duration_seconds: f64, audio_bitrate_bps: Option<i64>, fallback_bps: i64) -> Self {
        Self {
            duration_seconds,
            audio_bitrate_bps: audio_bitrate_bps.unwrap_or(fallback_bps),
            audio_bitrate_detected: audio_bitrate_bps.is_some(),
        }
    }

    /// Duration could be read from the encoder output
    pub fn has_duration(&self) -> bool {
        self.duration_seconds > 0.0
    }
}

/// Bitrate budget for one compression job.
///
/// `video_bitrate_bps` is allowed to be zero or negative; rejecting such a
/// plan is the caller's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionPlan {
    pub target_size_bytes: f64,
    pub video_bitrate_bps: f64,
    pub audio_bitrate_bps: i64,
}

impl CompressionPlan {
    /// Combined stream budget in bits per second
    pub fn total_bitrate_bps(&self) -> f64 {
        self.video_bitrate_bps + self.audio_bitrate_bps as f64
    }

    /// Video bitrate is positive and at least `floor_bps`
    pub fn is_feasible(&self, floor_bps: f64) -> bool {
        self.video_bitrate_bps > 0.0 && self.video_bitrate_bps >= floor_bps
    }

    /// Video bitrate as the integer argument handed to the encoder
    pub fn video_bitrate_arg(&self) -> String {
        format!("{:.0}", self.video_bitrate_bps)
    }
}

/// One encoder invocation. Built once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSpec {
    pub executable: String,
    pub arguments: Vec<String>,
    /// Forward diagnostic lines to the caller as they arrive
    pub captures_progress: bool,
    /// Working directory for the encoder; sidecar files land here
    pub working_dir: Option<PathBuf>,
}

impl PassSpec {
    pub fn new(executable: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments,
            captures_progress: false,
            working_dir: None,
        }
    }

    pub fn with_progress(mut self) -> Self {
        self.captures_progress = true;
        self
    }

    pub fn in_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Shell-like rendering for logs
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.arguments.len() + 1);
        parts.push(quote_arg(&self.executable));
        parts.extend(self.arguments.iter().map(|arg| quote_arg(arg)));
        parts.join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Outcome of a completed encoder process
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    pub exit_code: i32,
    pub succeeded: bool,
    /// Last diagnostic lines the process printed
    pub diagnostics: Vec<String>,
}

impl PassResult {
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            succeeded: exit_code == 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Progress of the encode pass at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSample {
    pub elapsed_seconds: f64,
    /// Always within 0.0..=1.0
    pub fraction_complete: f64,
    pub message: String,
}

impl ProgressSample {
    pub fn new(elapsed_seconds: f64, total_duration: f64) -> Self {
        let fraction_complete = if total_duration > 0.0 {
            (elapsed_seconds / total_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            elapsed_seconds,
            fraction_complete,
            message: format!("Processing... {:.2}%", fraction_complete * 100.0),
        }
    }
}

/// Requested output size: a recognized preset or an explicit MB value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetSize {
    /// Nominal limit in MB, mapped to a margin-adjusted size by configuration
    Preset(u32),
    /// Size in MB used as-is
    Custom(f64),
}

impl TargetSize {
    /// Parse a target argument. Whole numbers are treated as presets when
    /// `presets` knows them, everything else as an explicit MB value.
    pub fn parse(value: &str, presets: &[u32]) -> CompressResult<Self> {
        let trimmed = value.trim();
        let invalid = || CompressError::InvalidTargetSize {
            value: value.to_string(),
        };

        if let Ok(whole) = trimmed.parse::<u32>() {
            if presets.contains(&whole) {
                return Ok(TargetSize::Preset(whole));
            }
        }

        let megabytes: f64 = trimmed.parse().map_err(|_| invalid())?;
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(invalid());
        }

        Ok(TargetSize::Custom(megabytes))
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSize::Preset(mb) => write!(f, "{} MB preset", mb),
            TargetSize::Custom(mb) => write!(f, "{} MB", mb),
        }
    }
}

/// Lifecycle of a single compression job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Probing,
    Planning,
    Pass1Running,
    Pass2Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobState::Idle => "idle",
            JobState::Probing => "probing",
            JobState::Planning => "planning",
            JobState::Pass1Running => "pass 1",
            JobState::Pass2Running => "pass 2",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}
