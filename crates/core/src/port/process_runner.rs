// Process Runner Port
// Abstraction over the subprocess primitive that helper invocations delegate to

use crate::domain::OutputMode;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fully resolved request handed to a runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: PathBuf,
    /// Passed as argv, never through a shell
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub output: OutputMode,
    pub timeout: Option<Duration>,
}

/// What the runner observed once the child exited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// None when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub duration_ms: i64,
}

/// Runner errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Process timeout after {0}ms")]
    Timeout(u64),

    #[error("Process killed: {0}")]
    Killed(String),

    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

/// Process Runner trait
///
/// Implementations:
/// - TokioProcessRunner (infra-system): spawns a real child process
/// - MockProcessRunner: records specs, returns scripted output
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the program to completion
    ///
    /// Dropping the returned future must not leave the child running.
    ///
    /// # Errors
    /// - RunnerError::SpawnFailed if the OS refuses to start the process
    /// - RunnerError::Timeout if `spec.timeout` elapses first
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, RunnerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code; stdout is echoed in Capture mode
        Exit(i32, String),
        /// Terminated by a signal (no exit code)
        Signaled,
        /// Refuse to spawn with the given io error kind
        SpawnFail(std::io::ErrorKind),
        /// Report a timeout
        Timeout(u64),
    }

    /// Mock Process Runner for testing
    #[derive(Clone)]
    pub struct MockProcessRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        calls: Arc<Mutex<Vec<ProcessSpec>>>,
    }

    impl MockProcessRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Exit(0, String::new()))
        }
        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::Exit(code, String::new()))
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn calls(&self) -> Vec<ProcessSpec> {
            self.calls.lock().unwrap().clone()
        }
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, RunnerError> {
            self.calls.lock().unwrap().push(spec.clone());

            let behavior = self.behavior.lock().unwrap().clone();
            let captured = |text: String| (spec.output == OutputMode::Capture).then_some(text);

            match behavior {
                MockBehavior::Exit(code, stdout) => Ok(ProcessOutput {
                    exit_code: Some(code),
                    stdout: captured(stdout),
                    stderr: captured(String::new()),
                    duration_ms: 1,
                }),
                MockBehavior::Signaled => Ok(ProcessOutput {
                    exit_code: None,
                    stdout: captured(String::new()),
                    stderr: captured(String::new()),
                    duration_ms: 1,
                }),
                MockBehavior::SpawnFail(kind) => Err(RunnerError::SpawnFailed(
                    std::io::Error::new(kind, "mock spawn failure"),
                )),
                MockBehavior::Timeout(ms) => Err(RunnerError::Timeout(ms)),
            }
        }
    }
}
