// Helper invocation: resolve, check, delegate to the process runner
use crate::domain::error::{LaunchError, Result};
use crate::domain::{HelperProgram, InvocationOutcome, InvocationStatus, InvokeOptions};
use crate::port::{ProcessRunner, ProcessSpec, RunnerError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl HelperProgram {
    /// Run the helper once with `args` appended
    ///
    /// Each call is an independent child process. The resolved path is the
    /// only candidate; nothing else on the system is searched.
    ///
    /// # Errors
    /// - LaunchError::NotFound if the resolved file is missing or not executable
    /// - LaunchError::Execution if the runner could not start the process
    /// - LaunchError::Timeout if `options.timeout` elapsed
    /// - LaunchError::NonZeroExit if the child failed and `options.check` is set
    pub async fn invoke<I, S>(
        &self,
        runner: &dyn ProcessRunner,
        args: I,
        options: &InvokeOptions,
    ) -> Result<InvocationOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = self.resolve();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        if !is_executable_file(&path).await {
            warn!(helper = %self.program_name(), path = %path.display(), "Helper executable missing");
            return Err(LaunchError::NotFound { path, args });
        }

        info!(
            helper = %self.program_name(),
            cwd = ?options.cwd,
            "Running: {}",
            display_command(&path, &args)
        );

        let spec = ProcessSpec {
            program: path,
            args,
            cwd: options.cwd.clone(),
            env: options.env.clone(),
            output: options.output,
            timeout: options.timeout,
        };

        let output = match runner.run(&spec).await {
            Ok(output) => output,
            Err(RunnerError::Timeout(timeout_ms)) => {
                return Err(LaunchError::Timeout {
                    path: spec.program,
                    args: spec.args,
                    timeout_ms,
                })
            }
            Err(source) => {
                return Err(LaunchError::Execution {
                    path: spec.program,
                    args: spec.args,
                    source,
                })
            }
        };

        let status = if output.exit_code == Some(0) {
            InvocationStatus::Success
        } else {
            InvocationStatus::Failed
        };

        debug!(
            helper = %self.program_name(),
            exit_code = ?output.exit_code,
            duration_ms = output.duration_ms,
            status = %status,
            "Helper finished"
        );

        if status == InvocationStatus::Failed && options.check {
            return Err(LaunchError::NonZeroExit {
                path: spec.program,
                args: spec.args,
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(InvocationOutcome {
            program: spec.program,
            args: spec.args,
            status,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: output.duration_ms,
        })
    }
}

/// Partially apply `base_directory`
///
/// The returned constructor only needs the program name.
///
/// # Example
/// ```text
/// let helper = launcher_factory("/libapps/nassh/bin");
/// let fonts = helper("fonts")?;
/// ```
pub fn launcher_factory(
    base_directory: impl Into<PathBuf>,
) -> impl Fn(&str) -> Result<HelperProgram> + Clone {
    let base_directory = base_directory.into();
    move |program_name: &str| HelperProgram::new(base_directory.clone(), program_name)
}

/// Regular file with at least one execute bit (Unix); existence alone elsewhere
async fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };

    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Render a command for logs, quoting like a POSIX shell would need.
///
/// Display only: the child always receives the argv vector.
pub fn display_command(program: &Path, args: &[String]) -> String {
    std::iter::once(quote_arg(&program.to_string_lossy()))
        .chain(args.iter().map(|arg| quote_arg(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}
