//! Error handling module for VidSqueeze

use thiserror::Error;

/// Main error type for VidSqueeze operations
#[derive(Error, Debug)]
pub enum CompressError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// Target size that is neither a preset nor a positive number
    #[error("Invalid target size: {value}. Expected a preset (25, 50, 100) or a positive size in MB")]
    InvalidTargetSize { value: String },

    /// The encoder reported no duration for the input
    #[error("Could not determine the duration of {path}")]
    DurationUnknown { path: String },

    /// Input is already at or below the requested size
    #[error("Input is already {input_bytes} bytes, at or below the target of {target_bytes:.0} bytes")]
    AlreadyUnderTarget { input_bytes: u64, target_bytes: f64 },

    /// Computed video bitrate is unusable
    #[error("Target size is too small for this duration: video bitrate would be {video_bitrate_bps:.0} bps (minimum {floor_bps:.0} bps)")]
    PlanInfeasible { video_bitrate_bps: f64, floor_bps: f64 },

    /// The encoder executable could not be started at all
    #[error("Failed to start encoder '{executable}': {source}")]
    ProcessSpawnFailed {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// Analysis pass exited with a nonzero code
    #[error("First pass failed with exit code {exit_code} (video bitrate {video_bitrate_bps:.0} bps)")]
    Pass1Failed { exit_code: i32, video_bitrate_bps: f64 },

    /// Encode pass exited with a nonzero code
    #[error("Second pass failed with exit code {exit_code} (video bitrate {video_bitrate_bps:.0} bps)")]
    Pass2Failed { exit_code: i32, video_bitrate_bps: f64 },

    /// Job was cancelled while running
    #[error("Compression cancelled")]
    Cancelled,

    /// Sidecar removal failed; never fatal for a job
    #[error("Failed to clean up temporary files: {message}")]
    CleanupFailed { message: String },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompressError {
    /// Stable tag used in structured output
    pub fn kind(&self) -> &'static str {
        match self {
            CompressError::InputNotFound { .. } => "input_not_found",
            CompressError::InvalidTargetSize { .. } => "invalid_target_size",
            CompressError::DurationUnknown { .. } => "duration_unknown",
            CompressError::AlreadyUnderTarget { .. } => "already_under_target",
            CompressError::PlanInfeasible { .. } => "plan_infeasible",
            CompressError::ProcessSpawnFailed { .. } => "process_spawn_failed",
            CompressError::Pass1Failed { .. } => "pass1_failed",
            CompressError::Pass2Failed { .. } => "pass2_failed",
            CompressError::Cancelled => "cancelled",
            CompressError::CleanupFailed { .. } => "cleanup_failed",
            CompressError::Config { .. } => "config",
            CompressError::Io(_) => "io",
        }
    }

    /// Whether the error points at a missing or unusable encoder install
    pub fn is_encoder_missing(&self) -> bool {
        matches!(self, CompressError::ProcessSpawnFailed { .. })
    }
}

/// Result type alias for VidSqueeze operations
pub type CompressResult<T> = std::result::Result<T, CompressError>;
