//! Dedicated worker task per compression job

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CompressError, CompressResult};

/// Handle to a job running on its own task
pub struct JobHandle<T> {
    cancel: CancellationToken,
    task: JoinHandle<CompressResult<T>>,
}

impl<T> JobHandle<T> {
    /// Request cancellation; a running encoder process is killed
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.cancel.cancel();
    }

    /// Token shared with the job, e.g. for a Ctrl-C handler
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the job's terminal outcome
    pub async fn wait(self) -> CompressResult<T> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(CompressError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

/// Run `work` on a new tokio task. `work` receives the job's cancellation
/// token and must stop with `CompressError::Cancelled` once it fires.
pub fn spawn_job<F, Fut, T>(work: F) -> JobHandle<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = CompressResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let cancel = CancellationToken::new();
    let task = tokio::spawn(work(cancel.clone()));
    JobHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_job_returns_result() {
        let handle = spawn_job(|_cancel| async { Ok(42) });
        assert_eq!(handle.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancel_reaches_job() {
        let handle = spawn_job(|cancel| async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(CompressError::Cancelled),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(()),
            }
        });
        handle.cancel();
        assert!(matches!(handle.wait().await, Err(CompressError::Cancelled)));
    }
}
