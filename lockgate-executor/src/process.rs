//! Subprocess-backed [`CommandRunner`].
//!
//! Spawns the invocation with stdout and stderr piped, drains both into a
//! single buffer in arrival order, and enforces the configured deadline
//! and concurrency cap.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use lockgate_core::CommandInvocation;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{CommandRunner, ExecutorError, RunnerConfig};

const READ_CHUNK: usize = 4096;

/// Runs invocations as local child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: RunnerConfig,
    permits: Arc<Semaphore>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { permits: Arc::new(Semaphore::new(config.max_concurrent)), config }
    }

    #[must_use]
    pub fn config(&self) -> RunnerConfig {
        self.config
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<Vec<u8>, ExecutorError> {
        let invocation_id = Uuid::new_v4();
        let launch_failed = |reason: String| ExecutorError::LaunchFailed {
            program: invocation.program().to_owned(),
            reason,
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| launch_failed(format!("runner closed: {e}")))?;

        tracing::debug!(%invocation_id, command = %invocation.redacted(), "spawning command");

        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| launch_failed(e.to_string()))?;

        let mut output = Vec::new();
        let waited =
            tokio::time::timeout(self.config.timeout, collect_combined(&mut child, &mut output))
                .await;

        let finished = match waited {
            Ok(finished) => finished,
            Err(_) => {
                tracing::warn!(
                    %invocation_id,
                    timeout_ms = self.config.timeout.as_millis(),
                    "command timed out, killing"
                );
                let _ = child.kill().await;
                return Err(ExecutorError::TimedOut { after: self.config.timeout, output });
            }
        };
        if finished.is_err() {
            let _ = child.kill().await;
        }
        settle(invocation_id, finished, output)
    }
}

/// Map a finished (or unreadable) process to the invocation outcome.
///
/// The output gathered so far is kept on every failure path.
fn settle(
    invocation_id: Uuid,
    finished: std::io::Result<ExitStatus>,
    output: Vec<u8>,
) -> Result<Vec<u8>, ExecutorError> {
    match finished {
        Ok(status) if status.success() => {
            tracing::debug!(%invocation_id, bytes = output.len(), "command succeeded");
            Ok(output)
        }
        Ok(status) => {
            let code = status.code();
            tracing::warn!(%invocation_id, ?code, "command exited unsuccessfully");
            Err(ExecutorError::NonZeroExit { code, output })
        }
        Err(e) => {
            tracing::warn!(%invocation_id, error = %e, "reading command output failed, killed");
            Err(ExecutorError::NonZeroExit { code: None, output })
        }
    }
}

/// Read stdout and stderr into `combined` as chunks arrive, then reap.
///
/// Writes into a caller-owned buffer so partial output survives if the
/// future is dropped on timeout.
async fn collect_combined(
    child: &mut Child,
    combined: &mut Vec<u8>,
) -> std::io::Result<ExitStatus> {
    let missing = |name: &str| std::io::Error::other(format!("{name} not piped"));
    let mut stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let mut stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let (mut out_open, mut err_open) = (true, true);

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => {
                let n = read?;
                if n == 0 {
                    out_open = false;
                } else {
                    combined.extend_from_slice(&out_buf[..n]);
                }
            }
            read = stderr.read(&mut err_buf), if err_open => {
                let n = read?;
                if n == 0 {
                    err_open = false;
                } else {
                    combined.extend_from_slice(&err_buf[..n]);
                }
            }
        }
    }

    child.wait().await
}
