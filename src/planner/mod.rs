//! Bitrate planning for a target output size
//!
//! Pure arithmetic, no I/O. Headroom below a nominal limit is applied by the
//! caller when it picks `target_size_mb` (see the target presets in
//! configuration), never here.

use crate::domain::model::{CompressionPlan, BYTES_PER_MB};

/// Compute the bitrate budget for `target_size_mb` over `duration_seconds`.
///
/// `video_bitrate_bps` is total budget minus audio and is returned unclamped,
/// so it can come out zero or negative when the target is too small.
pub fn plan(target_size_mb: f64, duration_seconds: f64, audio_bitrate_bps: i64) -> CompressionPlan {
    let target_size_bytes = target_size_mb * BYTES_PER_MB;
    let total_bitrate_bps = target_size_bytes * 8.0 / duration_seconds;
    let video_bitrate_bps = total_bitrate_bps - audio_bitrate_bps as f64;

    CompressionPlan {
        target_size_bytes,
        video_bitrate_bps,
        audio_bitrate_bps,
    }
}
