// Tokio process runner
// reason: async-trait, tokio for async process management, nix for graceful termination
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use helperbin_core::application::constants::GRACEFUL_SHUTDOWN_TIMEOUT;
use helperbin_core::domain::OutputMode;
use helperbin_core::port::{ProcessOutput, ProcessRunner, ProcessSpec, RunnerError, TimeProvider};

type Drain = Option<JoinHandle<std::io::Result<String>>>;

/// Runs helper programs as real child processes
///
/// Children are spawned with `kill_on_drop`, so cancelling the `run` future
/// terminates the child instead of orphaning it.
pub struct TokioProcessRunner {
    time_provider: Arc<dyn TimeProvider>,
    grace_period: Duration,
}

impl TokioProcessRunner {
    /// Create a new process runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = TokioProcessRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            grace_period: GRACEFUL_SHUTDOWN_TIMEOUT,
        }
    }

    /// Override how long a timed-out child gets between SIGTERM and SIGKILL
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    fn build_command(&self, spec: &ProcessSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).envs(&spec.env).kill_on_drop(true);

        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        match spec.output {
            OutputMode::Capture => command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped()),
            OutputMode::Inherit => command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit()),
        };

        command
    }

    /// Spawn child process and wait for it, honoring the optional timeout
    async fn spawn_and_wait(
        &self,
        spec: &ProcessSpec,
    ) -> Result<(ExitStatus, Option<String>, Option<String>), RunnerError> {
        let mut child = self
            .build_command(spec)
            .spawn()
            .map_err(RunnerError::SpawnFailed)?;

        // Drain pipes concurrently so a chatty child never blocks on a full pipe
        let mut stdout = child.stdout.take().map(|out| tokio::spawn(drain(out)));
        let mut stderr = child.stderr.take().map(|err| tokio::spawn(drain(err)));

        let Some(limit) = spec.timeout else {
            let status = child.wait().await.map_err(RunnerError::Io)?;
            let out = collect(&mut stdout).await?;
            return Ok((status, out, collect(&mut stderr).await?));
        };

        // The limit covers the pipes too: a background process can hold them
        // open long after the helper itself has exited
        let finished = timeout(limit, async {
            let status = child.wait().await.map_err(RunnerError::Io)?;
            let out = collect(&mut stdout).await?;
            let err = collect(&mut stderr).await?;
            Ok::<_, RunnerError>((status, out, err))
        })
        .await;

        match finished {
            Ok(result) => result,
            Err(_) => {
                for handle in stdout.iter().chain(stderr.iter()) {
                    handle.abort();
                }
                self.terminate(&mut child).await?;
                Err(RunnerError::Timeout(limit.as_millis() as u64))
            }
        }
    }

    /// Kill process with SIGTERM first, then SIGKILL if needed
    async fn terminate(&self, child: &mut Child) -> Result<(), RunnerError> {
        if let Ok(Some(status)) = child.try_wait() {
            info!(status = %status, "Process already exited, output pipes still held open");
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = child.id() {
                info!(pid = %pid, "Sending SIGTERM for graceful shutdown");

                match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                    Ok(()) => {
                        if let Ok(Ok(status)) = timeout(self.grace_period, child.wait()).await {
                            info!(pid = %pid, status = %status, "Process exited gracefully after SIGTERM");
                            return Ok(());
                        }
                        warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                    }
                    Err(e) => warn!(pid = %pid, error = %e, "SIGTERM failed, sending SIGKILL"),
                }
            }
        }

        child
            .kill()
            .await
            .map_err(|e| RunnerError::Killed(format!("kill failed: {}", e)))
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, RunnerError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %spec.program.display(),
            args = ?spec.args,
            cwd = ?spec.cwd,
            timeout_ms = ?spec.timeout.map(|t| t.as_millis()),
            "Starting subprocess execution"
        );

        let (status, stdout, stderr) = self.spawn_and_wait(spec).await?;
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            program = %spec.program.display(),
            duration_ms = %duration_ms,
            exit_code = ?status.code(),
            "Subprocess execution completed"
        );

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration_ms,
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn collect(handle: &mut Drain) -> Result<Option<String>, RunnerError> {
    match handle {
        Some(handle) => {
            let text = handle
                .await
                .map_err(|e| RunnerError::Io(std::io::Error::other(e)))?
                .map_err(RunnerError::Io)?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}
