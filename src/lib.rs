//! VidSqueeze Library
//!
//! Compresses a video under a target file size by computing the bitrate
//! budget and supervising a two-pass encode with an external encoder.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use app::{CompressInteractor, CompressRequest, CompressionReport, InspectInteractor};
pub use config::CompressorConfig;
pub use domain::model::{CompressionPlan, JobState, MediaProbe, PassResult, PassSpec, ProgressSample, TargetSize};
pub use error::{CompressError, CompressResult};
pub use ports::{PassExecutor, ProgressSink};
