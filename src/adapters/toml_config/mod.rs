// TOML config adapter - Configuration files on disk

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::CompressorConfig;
use crate::error::{CompressError, CompressResult};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "VIDSQUEEZE_CONFIG";

/// File name searched in the working directory
pub const LOCAL_CONFIG_FILE: &str = "vidsqueeze.toml";

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Candidate config files in lookup order
    pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit {
            return vec![path.to_path_buf()];
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return vec![PathBuf::from(path)];
        }

        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::get_default_config_path() {
            paths.push(path);
        }
        paths
    }

    /// Per-user config file location
    fn get_default_config_path() -> Option<PathBuf> {
        // On Windows, use %APPDATA%/VidSqueeze/config.toml
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("VidSqueeze").join("config.toml"));
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("vidsqueeze").join("config.toml"));
        }
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("vidsqueeze")
                .join("config.toml")
        })
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> CompressResult<CompressorConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| CompressError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        CompressorConfig::from_toml_str(&content).map_err(|e| CompressError::Config {
            message: format!("{} ({})", e, path.display()),
        })
    }

    /// Load the first config file found, or defaults when there is none.
    /// An explicitly requested file must exist.
    pub fn load(explicit: Option<&Path>) -> CompressResult<(CompressorConfig, Option<PathBuf>)> {
        for path in Self::candidate_paths(explicit) {
            if path.is_file() {
                info!("Loading configuration from: {}", path.display());
                return Ok((Self::load_file(&path)?, Some(path)));
            }
            if explicit.is_some() {
                return Err(CompressError::Config {
                    message: format!("Config file does not exist: {}", path.display()),
                });
            }
            debug!("No config file at {}", path.display());
        }

        Ok((CompressorConfig::default(), None))
    }

    /// Write configuration to a file, creating parent directories
    pub fn save(config: &CompressorConfig, path: &Path) -> CompressResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CompressError::Config {
                    message: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        std::fs::write(path, config.to_toml_string()?).map_err(|e| CompressError::Config {
            message: format!("Failed to write config file: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SidecarNaming;

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[sidecar]\nnaming = \"fixed\"\ncleanup = false\n").unwrap();

        let (config, source) = TomlConfigAdapter::load(Some(&path)).unwrap();
        assert_eq!(config.sidecar.naming, SidecarNaming::Fixed);
        assert!(!config.sidecar.cleanup);
        assert_eq!(source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(TomlConfigAdapter::load(Some(&path)).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = CompressorConfig::default();
        config.encoder.constant_frame_rate = true;

        TomlConfigAdapter::save(&config, &path).unwrap();
        assert_eq!(TomlConfigAdapter::load_file(&path).unwrap(), config);
    }
}
