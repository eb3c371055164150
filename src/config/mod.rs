//! Typed configuration for compression jobs.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields a
//! working setup that drives `ffmpeg` from `PATH`.

use serde::{Deserialize, Serialize};

use crate::domain::model::{TargetSize, BYTES_PER_MB, DEFAULT_AUDIO_BITRATE_BPS};
use crate::error::{CompressError, CompressResult};

/// Default encoder executable name
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Null output target for the analysis pass
#[cfg(windows)]
pub const DEFAULT_NULL_TARGET: &str = "NUL";
#[cfg(not(windows))]
pub const DEFAULT_NULL_TARGET: &str = "/dev/null";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    pub encoder: EncoderConfig,
    pub bitrate: BitrateConfig,
    pub targets: TargetsConfig,
    pub sidecar: SidecarConfig,
    pub progress: ProgressConfig,
    pub logging: LoggingConfig,
}

/// How the encoder is invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub executable: String,
    /// `-c:v` value, omitted when `None`
    pub video_codec: Option<String>,
    /// `-c:a` value for the encode pass, omitted when `None`
    pub audio_codec: Option<String>,
    /// `-f` format of the analysis pass
    pub null_format: String,
    pub null_target: String,
    pub first_pass_audio: FirstPassAudio,
    /// Adds `-vsync cfr` to the analysis pass
    pub constant_frame_rate: bool,
    /// Adds `-report` to the analysis pass
    pub first_pass_report: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_ENCODER.to_string(),
            video_codec: Some("libx264".to_string()),
            audio_codec: Some("aac".to_string()),
            null_format: "null".to_string(),
            null_target: DEFAULT_NULL_TARGET.to_string(),
            first_pass_audio: FirstPassAudio::Disabled,
            constant_frame_rate: false,
            first_pass_report: false,
        }
    }
}

/// Audio handling during the analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPassAudio {
    /// `-an`
    Disabled,
    /// `-b:a <planned audio bitrate>`
    Bitrate,
}

/// Where the audio share of the budget comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioPolicy {
    /// Use the bitrate the encoder reports for the source audio
    Probe,
    /// Always use `fixed_audio_bps`
    Fixed,
}

impl std::str::FromStr for AudioPolicy {
    type Err = CompressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "probe" => Ok(AudioPolicy::Probe),
            "fixed" => Ok(AudioPolicy::Fixed),
            other => Err(CompressError::Config {
                message: format!("Invalid audio policy: {}. Valid policies: probe, fixed", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitrateConfig {
    pub audio_policy: AudioPolicy,
    pub fixed_audio_bps: i64,
    /// Used when probing finds no audio bitrate
    pub fallback_audio_bps: i64,
    /// Plans below this video bitrate are rejected
    pub min_video_bps: f64,
}

impl Default for BitrateConfig {
    fn default() -> Self {
        Self {
            audio_policy: AudioPolicy::Probe,
            fixed_audio_bps: DEFAULT_AUDIO_BITRATE_BPS,
            fallback_audio_bps: DEFAULT_AUDIO_BITRATE_BPS,
            min_video_bps: 1.0,
        }
    }
}

/// A nominal size limit and the size actually aimed for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPreset {
    pub nominal_mb: u32,
    pub effective_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    #[serde(rename = "preset")]
    pub presets: Vec<TargetPreset>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            presets: vec![
                TargetPreset { nominal_mb: 25, effective_mb: 24.9 },
                TargetPreset { nominal_mb: 50, effective_mb: 49.9 },
                TargetPreset { nominal_mb: 100, effective_mb: 99.9 },
            ],
        }
    }
}

impl TargetsConfig {
    /// Nominal sizes recognized as presets
    pub fn preset_names(&self) -> Vec<u32> {
        self.presets.iter().map(|preset| preset.nominal_mb).collect()
    }

    /// Parse a target argument against the configured presets
    pub fn parse_target(&self, value: &str) -> CompressResult<TargetSize> {
        TargetSize::parse(value, &self.preset_names())
    }

    /// Margin-adjusted size in MB for a target
    pub fn effective_mb(&self, target: TargetSize) -> CompressResult<f64> {
        match target {
            TargetSize::Custom(mb) => Ok(mb),
            TargetSize::Preset(nominal) => self
                .presets
                .iter()
                .find(|preset| preset.nominal_mb == nominal)
                .map(|preset| preset.effective_mb)
                .ok_or_else(|| CompressError::InvalidTargetSize {
                    value: nominal.to_string(),
                }),
        }
    }

    /// Margin-adjusted size in bytes for a target
    pub fn effective_bytes(&self, target: TargetSize) -> CompressResult<f64> {
        Ok(self.effective_mb(target)? * BYTES_PER_MB)
    }
}

/// Naming scheme for the analysis statistics files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidecarNaming {
    /// Private temporary directory per job
    PerJob,
    /// Encoder defaults in the current directory; jobs are serialized
    Fixed,
}

impl std::str::FromStr for SidecarNaming {
    type Err = CompressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "per_job" => Ok(SidecarNaming::PerJob),
            "fixed" => Ok(SidecarNaming::Fixed),
            other => Err(CompressError::Config {
                message: format!("Invalid sidecar naming: {}. Valid values: per_job, fixed", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
    pub naming: SidecarNaming,
    /// Remove sidecar files when a job ends
    pub cleanup: bool,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            naming: SidecarNaming::PerJob,
            cleanup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Samples closer together than this are coalesced; 0 disables coalescing
    pub min_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { min_interval_ms: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CompressorConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> CompressResult<Self> {
        toml::from_str(content).map_err(|e| CompressError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Serialize to a TOML document
    pub fn to_toml_string(&self) -> CompressResult<String> {
        toml::to_string_pretty(self).map_err(|e| CompressError::Config {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Audio bitrate the plan should reserve, given what probing found
    pub fn audio_bitrate_for(&self, probed_bps: i64) -> i64 {
        match self.bitrate.audio_policy {
            AudioPolicy::Probe => probed_bps,
            AudioPolicy::Fixed => self.bitrate.fixed_audio_bps,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CompressResult<()> {
        let invalid = |message: String| Err(CompressError::Config { message });

        if self.encoder.executable.trim().is_empty() {
            return invalid("encoder.executable must not be empty".to_string());
        }
        if self.encoder.null_format.trim().is_empty() {
            return invalid("encoder.null_format must not be empty".to_string());
        }
        if self.bitrate.fixed_audio_bps < 0 || self.bitrate.fallback_audio_bps < 0 {
            return invalid("audio bitrates cannot be negative".to_string());
        }
        if !self.bitrate.min_video_bps.is_finite() || self.bitrate.min_video_bps < 0.0 {
            return invalid("bitrate.min_video_bps cannot be negative".to_string());
        }
        for preset in &self.targets.presets {
            if !preset.effective_mb.is_finite() || preset.effective_mb <= 0.0 {
                return invalid(format!(
                    "preset {} MB must map to a positive size, got {}",
                    preset.nominal_mb, preset.effective_mb
                ));
            }
        }
        crate::adapters::tracing_log::parse_level(&self.logging.level)?;

        Ok(())
    }
}
