// Launch Error Types

use std::path::PathBuf;
use thiserror::Error;

use crate::port::RunnerError;

/// Errors from resolving or invoking a helper program.
///
/// Every invocation failure names the attempted path and the arguments.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Invalid program name: {0}")]
    InvalidName(String),

    #[error("Helper not found: {} (args: {args:?})", .path.display())]
    NotFound { path: PathBuf, args: Vec<String> },

    #[error("Failed to start {} (args: {args:?}): {source}", .path.display())]
    Execution {
        path: PathBuf,
        args: Vec<String>,
        #[source]
        source: RunnerError,
    },

    #[error("{} exited with {} (args: {args:?})", .path.display(), describe_code(.code))]
    NonZeroExit {
        path: PathBuf,
        args: Vec<String>,
        code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
    },

    #[error("{} timed out after {timeout_ms}ms (args: {args:?})", .path.display())]
    Timeout {
        path: PathBuf,
        args: Vec<String>,
        timeout_ms: u64,
    },

    #[error("Helper '{name}' is not registered (known: {})", .known.join(", "))]
    NotRegistered { name: String, known: Vec<String> },
}

impl LaunchError {
    /// Exit code carried by a `NonZeroExit`
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
