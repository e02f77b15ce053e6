// Invocation Domain Model: options in, outcome out

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// What happens to the child's stdout/stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Child shares the caller's streams
    #[default]
    Inherit,
    /// Child output is collected and returned in the outcome
    Capture,
}

/// Per-invocation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOptions {
    pub output: OutputMode,
    /// Turn a non-zero exit into `LaunchError::NonZeroExit`
    pub check: bool,
    pub cwd: Option<PathBuf>,
    /// Layered on top of the inherited environment
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            output: OutputMode::Inherit,
            check: true,
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }

    /// Return the exit status as data instead of failing on non-zero
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Invocation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationStatus {
    Success,
    Failed,
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationStatus::Success => write!(f, "SUCCESS"),
            InvocationStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Result of one helper invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub status: InvocationStatus,
    /// None when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub duration_ms: i64,
}

impl InvocationOutcome {
    pub fn success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = InvokeOptions::default();

        assert_eq!(options.output, OutputMode::Inherit);
        assert!(options.check);
        assert!(options.cwd.is_none());
        assert!(options.env.is_empty());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let options = InvokeOptions::new()
            .capture()
            .unchecked()
            .cwd("/tmp")
            .env("LANG", "C")
            .timeout(Duration::from_secs(3));

        assert_eq!(options.output, OutputMode::Capture);
        assert!(!options.check);
        assert_eq!(options.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(options.env.get("LANG").map(String::as_str), Some("C"));
        assert_eq!(options.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_outcome_serializes_status() {
        let outcome = InvocationOutcome {
            program: PathBuf::from("/tools/fonts"),
            args: vec!["--list".to_string()],
            status: InvocationStatus::Failed,
            exit_code: Some(2),
            stdout: None,
            stderr: None,
            duration_ms: 5,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "FAILED");
        assert_eq!(json["exit_code"], 2);
        assert!(!outcome.success());
    }
}
