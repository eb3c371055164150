//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::adapters::TomlConfigAdapter;
use crate::cli::Cli;
use crate::config::CompressorConfig;
use crate::error::{CompressError, CompressResult};

pub const ENV_AUDIO_POLICY: &str = "VIDSQUEEZE_AUDIO_POLICY";
pub const ENV_SIDECAR_NAMING: &str = "VIDSQUEEZE_SIDECAR_NAMING";
pub const ENV_MIN_VIDEO_BPS: &str = "VIDSQUEEZE_MIN_VIDEO_BPS";

/// Build the effective configuration following precedence:
/// CLI > Env > File > Defaults.
///
/// Returns the config file that was used, if any. Runs before logging is
/// set up, so callers log the source themselves.
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<(CompressorConfig, Option<PathBuf>)> {
    // Step 1 and 2: defaults, then the first config file found
    let (mut config, source) =
        TomlConfigAdapter::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Step 3: environment overrides
    apply_environment_overrides(&mut config, |key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    // Step 4: CLI overrides; clap has already folded in the env-backed flags
    apply_cli_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;
    Ok((config, source))
}

/// Apply `VIDSQUEEZE_*` variables read through `lookup`
pub fn apply_environment_overrides<F>(config: &mut CompressorConfig, lookup: F) -> CompressResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(value) = lookup(ENV_AUDIO_POLICY) {
        config.bitrate.audio_policy = value.parse()?;
        applied += 1;
    }
    if let Some(value) = lookup(ENV_SIDECAR_NAMING) {
        config.sidecar.naming = value.parse()?;
        applied += 1;
    }
    if let Some(value) = lookup(ENV_MIN_VIDEO_BPS) {
        config.bitrate.min_video_bps = value.trim().parse().map_err(|_| CompressError::Config {
            message: format!("{} must be a number, got '{}'", ENV_MIN_VIDEO_BPS, value),
        })?;
        applied += 1;
    }

    Ok(applied)
}

/// Apply global CLI flags
pub fn apply_cli_overrides(config: &mut CompressorConfig, cli: &Cli) {
    if let Some(encoder) = &cli.encoder {
        config.encoder.executable = encoder.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }
}
