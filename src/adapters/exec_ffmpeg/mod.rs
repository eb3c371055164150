//! FFmpeg execution adapter
//!
//! Runs encoder passes as child processes with `tokio::process`, streaming the
//! diagnostic channel (stderr) line by line while the process runs.

use std::collections::VecDeque;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::model::{PassResult, PassSpec};
use crate::error::{CompressError, CompressResult};
use crate::ports::PassExecutor;

/// Diagnostic lines kept for failure reports
pub const DEFAULT_TAIL_LINES: usize = 20;

/// Subprocess-based pass executor
pub struct FFmpegAdapter {
    tail_lines: usize,
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Keep the last `tail_lines` diagnostic lines of every pass
    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines;
        self
    }

    fn build_command(spec: &PassSpec) -> Command {
        let mut command = Command::new(&spec.executable);
        command
            .args(&spec.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }

    async fn abort(child: &mut Child, spec: &PassSpec) -> CompressError {
        warn!("Cancelling encoder process: {}", spec.executable);
        if let Err(e) = child.kill().await {
            warn!("Failed to kill encoder process: {}", e);
        }
        CompressError::Cancelled
    }
}

#[async_trait]
impl PassExecutor for FFmpegAdapter {
    async fn run_pass(
        &self,
        spec: &PassSpec,
        mut on_line: Option<&mut (dyn for<'l> FnMut(&'l str) + Send)>,
        cancel: &CancellationToken,
    ) -> CompressResult<PassResult> {
        if cancel.is_cancelled() {
            return Err(CompressError::Cancelled);
        }

        debug!("Running: {}", spec.command_line());
        let mut child = Self::build_command(spec)
            .spawn()
            .map_err(|source| CompressError::ProcessSpawnFailed {
                executable: spec.executable.clone(),
                source,
            })?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(self.tail_lines);

        // Drain stderr to EOF so the encoder never blocks on a full pipe
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                let read = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    read = reader.read_until(b'\n', &mut buf) => Some(read),
                };

                match read {
                    None => return Err(Self::abort(&mut child, spec).await),
                    Some(Ok(0)) => break,
                    Some(Ok(_)) => {
                        for line in split_lines(&buf) {
                            if spec.captures_progress {
                                if let Some(callback) = on_line.as_mut() {
                                    callback(&line);
                                }
                            }
                            if self.tail_lines > 0 {
                                if tail.len() == self.tail_lines {
                                    tail.pop_front();
                                }
                                tail.push_back(line);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Stopped reading encoder output: {}", e);
                        break;
                    }
                }
            }
        }

        let waited = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let status = match waited {
            None => return Err(Self::abort(&mut child, spec).await),
            Some(status) => status?,
        };

        // Killed by a signal has no code
        let exit_code = status.code().unwrap_or(-1);
        debug!("{} exited with code {}", spec.executable, exit_code);

        Ok(PassResult::from_exit_code(exit_code).with_diagnostics(tail.into_iter().collect()))
    }
}

/// Split a raw chunk into lines on `\n` and `\r`, decoding lossily.
/// The encoder redraws its status line with bare carriage returns.
fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .split(|c: char| c == '\n' || c == '\r')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
