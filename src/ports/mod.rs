// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::model::{JobState, PassResult, PassSpec};
use crate::error::CompressResult;

/// Port for running one encoder process to completion
#[async_trait]
pub trait PassExecutor: Send + Sync {
    /// Run `spec` and wait for the process to exit.
    ///
    /// Lines are handed to `on_line` as they arrive when
    /// `spec.captures_progress` is set. A nonzero exit is a normal `PassResult`; only a process
    /// that cannot be started is an error (`ProcessSpawnFailed`).
    /// Cancelling `cancel` kills the process and yields `Cancelled`.
    async fn run_pass(
        &self,
        spec: &PassSpec,
        on_line: Option<&mut (dyn for<'l> FnMut(&'l str) + Send)>,
        cancel: &CancellationToken,
    ) -> CompressResult<PassResult>;
}

/// Port for progress reporting to a presentation layer.
///
/// Called from the job's worker task; implementations marshal to their own
/// thread if they need to.
pub trait ProgressSink: Send + Sync {
    /// Encode progress, `fraction_complete` within 0.0..=1.0
    fn notify(&self, fraction_complete: f64, message: &str);

    /// Job lifecycle transition
    fn on_state(&self, _state: JobState) {}
}
