//! Output-side resources: sidecar workspace and output path policy

use std::path::{Path, PathBuf};

pub mod sidecar;

pub use sidecar::{CleanupStatus, SidecarWorkspace};

/// Suffix appended to the input stem for the default output name
pub const OUTPUT_SUFFIX: &str = "_compressed";
/// Container of the default output
pub const OUTPUT_EXTENSION: &str = "mp4";

/// `<input dir>/<input stem>_compressed.mp4`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, OUTPUT_EXTENSION);

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/holiday clip.mov")),
            PathBuf::from("/videos/holiday clip_compressed.mp4")
        );
        assert_eq!(default_output_path(Path::new("a.mp4")), PathBuf::from("a_compressed.mp4"));
    }
}
