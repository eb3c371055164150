// Compress interactor - Orchestrates the two-pass compression use case

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::CompressorConfig;
use crate::domain::model::{CompressionPlan, JobState, MediaProbe, PassResult, TargetSize};
use crate::engine::progress::{ProgressThrottle, ProgressTracker};
use crate::engine::{spawn_job, JobHandle, PassBuilder};
use crate::error::{CompressError, CompressResult};
use crate::output::{CleanupStatus, SidecarWorkspace};
use crate::planner;
use crate::ports::{PassExecutor, ProgressSink};
use crate::probe::MediaProber;
use crate::utils::Utils;

/// One compression job
#[derive(Debug, Clone)]
pub struct CompressRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub target: TargetSize,
    /// Let the encoder replace an existing output file
    pub overwrite: bool,
}

impl CompressRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, target: TargetSize) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            target,
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// What a successful job produced
#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub probe: MediaProbe,
    pub plan: CompressionPlan,
    pub input_bytes: u64,
    /// Size of the written output, if it could be read back
    pub output_bytes: Option<u64>,
    pub elapsed_seconds: f64,
    pub cleanup: CleanupStatus,
}

/// Interactor for the compression use case
pub struct CompressInteractor {
    executor: Arc<dyn PassExecutor>,
    config: CompressorConfig,
}

impl CompressInteractor {
    /// Create new compress interactor with an injected executor
    pub fn new(executor: Arc<dyn PassExecutor>, config: CompressorConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Run `request` on a dedicated task
    pub fn spawn(
        self: Arc<Self>,
        request: CompressRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> JobHandle<CompressionReport> {
        spawn_job(move |cancel| async move { self.compress(&request, sink.as_ref(), &cancel).await })
    }

    /// Compress one file: probe, plan, pass 1, pass 2, cleanup.
    ///
    /// Every exit is reported to `sink` as a terminal `JobState`.
    pub async fn compress(
        &self,
        request: &CompressRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CompressResult<CompressionReport> {
        let result = self.run(request, sink, cancel).await;

        match &result {
            Ok(report) => {
                info!(
                    "Compressed {} -> {} in {:.1}s",
                    report.input_path.display(),
                    report.output_path.display(),
                    report.elapsed_seconds
                );
                enter(sink, JobState::Succeeded);
            }
            Err(CompressError::Cancelled) => enter(sink, JobState::Cancelled),
            Err(e) => {
                error!("Compression of {} failed: {}", request.input_path.display(), e);
                enter(sink, JobState::Failed);
            }
        }

        result
    }

    async fn run(
        &self,
        request: &CompressRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CompressResult<CompressionReport> {
        let started = Instant::now();
        enter(sink, JobState::Idle);

        // The encoder may run elsewhere, so hand it absolute paths
        let input = Utils::absolutize(&request.input_path)?;
        let output = Utils::absolutize(&request.output_path)?;
        let input_bytes = input_size(&input)?;

        let target_mb = self.config.targets.effective_mb(request.target)?;
        let target_bytes = self.config.targets.effective_bytes(request.target)?;
        if input_bytes as f64 <= target_bytes {
            return Err(CompressError::AlreadyUnderTarget {
                input_bytes,
                target_bytes,
            });
        }

        ensure_running(cancel)?;
        enter(sink, JobState::Probing);
        let prober = MediaProber::new(
            Arc::clone(&self.executor),
            self.config.encoder.executable.clone(),
            self.config.bitrate.fallback_audio_bps,
        );
        let probe = prober.probe(&input, cancel).await?;
        if !probe.has_duration() {
            return Err(CompressError::DurationUnknown {
                path: input.display().to_string(),
            });
        }

        enter(sink, JobState::Planning);
        let audio_bitrate_bps = self.config.audio_bitrate_for(probe.audio_bitrate_bps);
        let plan = planner::plan(target_mb, probe.duration_seconds, audio_bitrate_bps);
        info!(
            "Plan for {}: video {}, audio {}, total {}",
            request.target,
            Utils::format_bitrate(plan.video_bitrate_bps),
            Utils::format_bitrate(plan.audio_bitrate_bps as f64),
            Utils::format_bitrate(plan.total_bitrate_bps())
        );
        let floor_bps = self.config.bitrate.min_video_bps;
        if !plan.is_feasible(floor_bps) {
            return Err(CompressError::PlanInfeasible {
                video_bitrate_bps: plan.video_bitrate_bps,
                floor_bps,
            });
        }

        let workspace = SidecarWorkspace::acquire(self.config.sidecar.naming, cancel).await?;
        let passes = self
            .run_passes(&input, &output, request.overwrite, &plan, &probe, &workspace, sink, cancel)
            .await;

        // Sidecar files go away whatever the passes did
        let cleanup = workspace.cleanup(self.config.sidecar.cleanup);
        if let CleanupStatus::Failed { message } = &cleanup {
            warn!("Sidecar cleanup failed: {}", message);
        }
        passes?;

        let output_bytes = std::fs::metadata(&output).map(|m| m.len()).ok();
        if let Some(bytes) = output_bytes {
            info!(
                "Output size {} (target {})",
                Utils::format_file_size(bytes),
                Utils::format_file_size(target_bytes as u64)
            );
        }

        Ok(CompressionReport {
            input_path: input,
            output_path: output,
            probe,
            plan,
            input_bytes,
            output_bytes,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            cleanup,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_passes(
        &self,
        input: &Path,
        output: &Path,
        overwrite: bool,
        plan: &CompressionPlan,
        probe: &MediaProbe,
        workspace: &SidecarWorkspace,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CompressResult<()> {
        let builder = PassBuilder::new(&self.config.encoder);

        ensure_running(cancel)?;
        enter(sink, JobState::Pass1Running);
        let first = builder.first_pass(input, plan, workspace.working_dir());
        let result = self.executor.run_pass(&first, None, cancel).await?;
        if !result.succeeded {
            log_diagnostics("First pass", &result);
            return Err(CompressError::Pass1Failed {
                exit_code: result.exit_code,
                video_bitrate_bps: plan.video_bitrate_bps,
            });
        }

        ensure_running(cancel)?;
        enter(sink, JobState::Pass2Running);
        let second = builder.second_pass(input, output, plan, overwrite, workspace.working_dir());

        let total_duration = probe.duration_seconds;
        let mut tracker = ProgressTracker::new();
        let mut throttle = ProgressThrottle::new(Duration::from_millis(self.config.progress.min_interval_ms));
        let mut on_line = |line: &str| {
            if let Some(sample) = tracker.on_line(line, total_duration) {
                if throttle.should_emit(sample.fraction_complete) {
                    sink.notify(sample.fraction_complete, &sample.message);
                }
            }
        };

        let result = self.executor.run_pass(&second, Some(&mut on_line), cancel).await?;
        if !result.succeeded {
            log_diagnostics("Second pass", &result);
            return Err(CompressError::Pass2Failed {
                exit_code: result.exit_code,
                video_bitrate_bps: plan.video_bitrate_bps,
            });
        }

        sink.notify(1.0, "Compression complete");
        Ok(())
    }
}

fn enter(sink: &dyn ProgressSink, state: JobState) {
    info!("Job state: {}", state);
    sink.on_state(state);
}

fn ensure_running(cancel: &CancellationToken) -> CompressResult<()> {
    if cancel.is_cancelled() {
        Err(CompressError::Cancelled)
    } else {
        Ok(())
    }
}

fn input_size(input: &Path) -> CompressResult<u64> {
    match std::fs::metadata(input) {
        Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
        Ok(_) => Err(CompressError::InputNotFound {
            path: input.display().to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CompressError::InputNotFound {
            path: input.display().to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn log_diagnostics(pass: &str, result: &PassResult) {
    error!("{} exited with code {}", pass, result.exit_code);
    for line in &result.diagnostics {
        error!("  {}", line);
    }
}
