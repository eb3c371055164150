//! Media file probing through the encoder's diagnostic output

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::model::{MediaProbe, PassSpec};
use crate::error::CompressResult;
use crate::ports::PassExecutor;

pub mod scanner;

pub use scanner::ProbeScanner;

/// Arguments for a metadata-only encoder run: `-i <input>`
pub fn probe_arguments(input: &Path) -> Vec<String> {
    vec!["-i".to_string(), input.to_string_lossy().into_owned()]
}

/// Extracts duration and audio bitrate by running the encoder without an output
pub struct MediaProber {
    executor: Arc<dyn PassExecutor>,
    encoder: String,
    fallback_audio_bps: i64,
}

impl MediaProber {
    pub fn new(executor: Arc<dyn PassExecutor>, encoder: impl Into<String>, fallback_audio_bps: i64) -> Self {
        Self {
            executor,
            encoder: encoder.into(),
            fallback_audio_bps,
        }
    }

    /// Probe a media file.
    ///
    /// A missing duration is reported as `duration_seconds == 0`, not as an
    /// error. The encoder's exit code is ignored: it exits nonzero whenever
    /// no output file is given.
    pub async fn probe(&self, path: &Path, cancel: &CancellationToken) -> CompressResult<MediaProbe> {
        info!("Probing media file: {}", path.display());

        let spec = PassSpec::new(self.encoder.clone(), probe_arguments(path)).with_progress();
        let mut scanner = ProbeScanner::new();
        let mut feed = |line: &str| scanner.feed(line);

        let result = self.executor.run_pass(&spec, Some(&mut feed), cancel).await?;
        debug!(
            "Probe finished with exit code {} after {} lines",
            result.exit_code,
            scanner.lines_seen()
        );

        let probe = scanner.finish(self.fallback_audio_bps);
        info!(
            "Probe result: duration {:.2}s, audio {} bps{}",
            probe.duration_seconds,
            probe.audio_bitrate_bps,
            if probe.audio_bitrate_detected { "" } else { " (fallback)" }
        );

        Ok(probe)
    }
}
