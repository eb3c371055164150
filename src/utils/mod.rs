//! Common utilities and helpers

use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod time;

/// Utility functions for VidSqueeze
pub struct Utils;

impl Utils {
    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = duration.subsec_millis();

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }

    /// Format file size for display
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Format a bitrate in bits per second as kb/s
    pub fn format_bitrate(bps: f64) -> String {
        format!("{:.0} kb/s", bps / 1000.0)
    }

    /// Resolve `path` against the current directory when it is relative.
    /// The encoder may run in a different working directory than the caller.
    pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(Utils::format_file_size(512), "512 B");
        assert_eq!(Utils::format_file_size(26_109_542), "24.90 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(Utils::format_duration(Duration::from_millis(90_500)), "01:30.500");
        assert_eq!(Utils::format_duration(Duration::from_secs(3_725)), "01:02:05.000");
    }

    #[test]
    fn test_absolutize_keeps_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Utils::absolutize(dir.path()).unwrap(), dir.path());
        assert!(Utils::absolutize(Path::new("clip.mp4")).unwrap().is_absolute());
    }
}
