//! Working directory for the encoder's two-pass statistics files

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use serde::Serialize;
use tempfile::TempDir;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SidecarNaming;
use crate::error::{CompressError, CompressResult};

/// Statistics file written by pass 1 under the default pass-log prefix
pub const PASS_LOG_FILE: &str = "ffmpeg2pass-0.log";
/// Macroblock-tree companion of the pass log
pub const PASS_LOG_MBTREE_FILE: &str = "ffmpeg2pass-0.log.mbtree";

const REPORT_PREFIX: &str = "ffmpeg-";
const REPORT_SUFFIX: &str = ".log";

static FIXED_SIDECAR_LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();

fn fixed_sidecar_lock() -> Arc<Mutex<()>> {
    FIXED_SIDECAR_LOCK
        .get_or_init(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Outcome of removing sidecar files after a job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    /// Files removed
    Removed { files: usize },
    /// Cleanup disabled; files left in place
    Kept { directory: PathBuf },
    /// Removal failed; the job still succeeded
    Failed { message: String },
}

/// Where pass 1 and pass 2 find their shared statistics files.
///
/// `PerJob` gives each job a private temporary directory, so concurrent jobs
/// never see each other's files. `Fixed` uses the current directory and
/// holds a process-wide lock until the workspace is cleaned up or dropped.
pub enum SidecarWorkspace {
    PerJob {
        dir: TempDir,
    },
    Fixed {
        dir: PathBuf,
        started: SystemTime,
        _guard: OwnedMutexGuard<()>,
    },
}

impl SidecarWorkspace {
    /// Acquire a workspace; `Fixed` waits for any other job holding the lock
    /// until `cancel` fires
    pub async fn acquire(naming: SidecarNaming, cancel: &CancellationToken) -> CompressResult<Self> {
        match naming {
            SidecarNaming::PerJob => {
                let dir = tempfile::Builder::new().prefix("vidsqueeze-").tempdir()?;
                debug!("Per-job sidecar directory: {}", dir.path().display());
                Ok(SidecarWorkspace::PerJob { dir })
            }
            SidecarNaming::Fixed => {
                let lock = fixed_sidecar_lock();
                let guard = match lock.clone().try_lock_owned() {
                    Ok(guard) => guard,
                    Err(_) => {
                        info!("Waiting for another job using the shared sidecar files");
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Err(CompressError::Cancelled),
                            guard = lock.lock_owned() => guard,
                        }
                    }
                };
                Ok(SidecarWorkspace::Fixed {
                    dir: std::env::current_dir()?,
                    started: SystemTime::now(),
                    _guard: guard,
                })
            }
        }
    }

    /// Directory the encoder should run in; `None` keeps the current one
    pub fn working_dir(&self) -> Option<PathBuf> {
        match self {
            SidecarWorkspace::PerJob { dir } => Some(dir.path().to_path_buf()),
            SidecarWorkspace::Fixed { .. } => None,
        }
    }

    /// Directory where sidecar files land
    pub fn directory(&self) -> &Path {
        match self {
            SidecarWorkspace::PerJob { dir } => dir.path(),
            SidecarWorkspace::Fixed { dir, .. } => dir,
        }
    }

    /// Paths of the fixed-name pass log files
    pub fn sidecar_paths(&self) -> [PathBuf; 2] {
        let dir = self.directory();
        [dir.join(PASS_LOG_FILE), dir.join(PASS_LOG_MBTREE_FILE)]
    }

    /// Remove sidecar files. Best-effort: failures come back as
    /// `CleanupStatus::Failed` and are logged, never returned as errors.
    #[allow(deprecated)]
    pub fn cleanup(self, enabled: bool) -> CleanupStatus {
        if !enabled {
            let directory = match self {
                SidecarWorkspace::PerJob { dir } => dir.into_path(),
                SidecarWorkspace::Fixed { dir, .. } => dir,
            };
            info!("Keeping sidecar files in {}", directory.display());
            return CleanupStatus::Kept { directory };
        }

        let result = match self {
            SidecarWorkspace::PerJob { dir } => remove_per_job(dir),
            SidecarWorkspace::Fixed { dir, started, .. } => remove_fixed(&dir, started),
        };

        match result {
            Ok(files) => {
                debug!("Removed {} sidecar file(s)", files);
                CleanupStatus::Removed { files }
            }
            Err(e) => {
                warn!("{}", e);
                CleanupStatus::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

fn remove_per_job(dir: TempDir) -> CompressResult<usize> {
    let files = fs::read_dir(dir.path()).map(|entries| entries.count()).unwrap_or(0);
    let path = dir.path().to_path_buf();
    dir.close().map_err(|e| CompressError::CleanupFailed {
        message: format!("{}: {}", path.display(), e),
    })?;
    Ok(files)
}

fn remove_fixed(dir: &Path, started: SystemTime) -> CompressResult<usize> {
    let mut targets: Vec<PathBuf> = [PASS_LOG_FILE, PASS_LOG_MBTREE_FILE]
        .iter()
        .map(|name| dir.join(name))
        .collect();
    targets.extend(report_files_since(dir, started));

    let mut removed = 0;
    let mut failures = Vec::new();
    for path in targets {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => failures.push(format!("{}: {}", path.display(), e)),
        }
    }

    if failures.is_empty() {
        Ok(removed)
    } else {
        Err(CompressError::CleanupFailed {
            message: failures.join("; "),
        })
    }
}

/// `ffmpeg-*.log` report files modified at or after `since`
fn report_files_since(dir: &Path, since: SystemTime) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(REPORT_PREFIX) && name.ends_with(REPORT_SUFFIX)
        })
        .filter(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .map(|modified| modified >= since)
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_per_job_directories_are_unique() {
        let a = SidecarWorkspace::acquire(SidecarNaming::PerJob, &CancellationToken::new()).await.unwrap();
        let b = SidecarWorkspace::acquire(SidecarNaming::PerJob, &CancellationToken::new()).await.unwrap();
        assert_ne!(a.working_dir(), b.working_dir());
        assert!(a.working_dir().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_per_job_cleanup_removes_directory() {
        let workspace = SidecarWorkspace::acquire(SidecarNaming::PerJob, &CancellationToken::new()).await.unwrap();
        let dir = workspace.directory().to_path_buf();
        for path in workspace.sidecar_paths() {
            fs::write(path, b"stats").unwrap();
        }

        assert_eq!(workspace.cleanup(true), CleanupStatus::Removed { files: 2 });
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_disabled_cleanup_keeps_files() {
        let workspace = SidecarWorkspace::acquire(SidecarNaming::PerJob, &CancellationToken::new()).await.unwrap();
        let [log, _] = workspace.sidecar_paths();
        fs::write(&log, b"stats").unwrap();

        match workspace.cleanup(false) {
            CleanupStatus::Kept { directory } => {
                assert!(log.exists());
                fs::remove_dir_all(directory).unwrap();
            }
            other => panic!("unexpected cleanup status: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_fixed_lock() {
        let cancel = CancellationToken::new();
        let held = SidecarWorkspace::acquire(SidecarNaming::Fixed, &cancel).await.unwrap();

        let waiter_cancel = CancellationToken::new();
        let waiter = tokio::spawn({
            let token = waiter_cancel.clone();
            async move { SidecarWorkspace::acquire(SidecarNaming::Fixed, &token).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!waiter.is_finished());

        waiter_cancel.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .expect("acquire ignored cancellation")
            .unwrap();
        assert!(matches!(result, Err(CompressError::Cancelled)));

        // The holder is unaffected and releases normally
        assert!(matches!(held.cleanup(false), CleanupStatus::Kept { .. }));
        let again = SidecarWorkspace::acquire(SidecarNaming::Fixed, &cancel).await.unwrap();
        drop(again);
    }

    #[test]
    fn test_fixed_removal_ignores_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PASS_LOG_FILE), b"stats").unwrap();
        assert_eq!(remove_fixed(dir.path(), SystemTime::now()).unwrap(), 1);
        assert_eq!(remove_fixed(dir.path(), SystemTime::now()).unwrap(), 0);
    }

    #[test]
    fn test_report_files_only_since_start() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("ffmpeg-20240101-120000.log");
        fs::write(&report, b"report").unwrap();
        fs::write(dir.path().join("notes.log"), b"other").unwrap();

        let found = report_files_since(dir.path(), SystemTime::UNIX_EPOCH);
        assert_eq!(found, vec![report]);

        let later = SystemTime::now() + std::time::Duration::from_secs(3600);
        assert!(report_files_since(dir.path(), later).is_empty());
    }
}
