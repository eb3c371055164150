// Inspect interactor - Probes a file and previews the plan for a target

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::CompressorConfig;
use crate::domain::model::{CompressionPlan, MediaProbe, TargetSize};
use crate::error::{CompressError, CompressResult};
use crate::planner;
use crate::ports::PassExecutor;
use crate::probe::MediaProber;
use crate::utils::Utils;

/// What a compression to `target` would look like
#[derive(Debug, Clone, Serialize)]
pub struct TargetPreview {
    pub target: TargetSize,
    pub effective_mb: f64,
    pub target_bytes: f64,
    /// Absent when the duration is unknown
    pub plan: Option<CompressionPlan>,
    pub already_under_target: bool,
    pub feasible: bool,
}

/// Probe results for one file
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub input_path: PathBuf,
    pub input_bytes: u64,
    pub probe: MediaProbe,
    pub preview: Option<TargetPreview>,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    executor: Arc<dyn PassExecutor>,
    config: CompressorConfig,
}

impl InspectInteractor {
    /// Create new inspect interactor with an injected executor
    pub fn new(executor: Arc<dyn PassExecutor>, config: CompressorConfig) -> Self {
        Self { executor, config }
    }

    /// Probe `input`; with a target, also compute the plan without encoding
    pub async fn inspect(
        &self,
        input: &std::path::Path,
        target: Option<TargetSize>,
        cancel: &CancellationToken,
    ) -> CompressResult<InspectReport> {
        let input_path = Utils::absolutize(input)?;
        let input_bytes = match std::fs::metadata(&input_path) {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            _ => {
                return Err(CompressError::InputNotFound {
                    path: input_path.display().to_string(),
                })
            }
        };

        info!("Inspecting {}", input_path.display());
        let prober = MediaProber::new(
            Arc::clone(&self.executor),
            self.config.encoder.executable.clone(),
            self.config.bitrate.fallback_audio_bps,
        );
        let probe = prober.probe(&input_path, cancel).await?;

        let preview = target
            .map(|target| self.preview(target, &probe, input_bytes))
            .transpose()?;

        Ok(InspectReport {
            input_path,
            input_bytes,
            probe,
            preview,
        })
    }

    fn preview(&self, target: TargetSize, probe: &MediaProbe, input_bytes: u64) -> CompressResult<TargetPreview> {
        let effective_mb = self.config.targets.effective_mb(target)?;
        let target_bytes = self.config.targets.effective_bytes(target)?;
        let already_under_target = input_bytes as f64 <= target_bytes;

        let plan = probe.has_duration().then(|| {
            let audio = self.config.audio_bitrate_for(probe.audio_bitrate_bps);
            planner::plan(effective_mb, probe.duration_seconds, audio)
        });
        let feasible = !already_under_target
            && plan
                .as_ref()
                .map(|p| p.is_feasible(self.config.bitrate.min_video_bps))
                .unwrap_or(false);

        Ok(TargetPreview {
            target,
            effective_mb,
            target_bytes,
            plan,
            already_under_target,
            feasible,
        })
    }
}
