// Launcher constants (no magic values)
use std::time::Duration;

/// Grace period between SIGTERM and SIGKILL when a helper times out (5 seconds)
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Sibling project holding the shared support tooling
pub const DEFAULT_SHARED_PROJECT: &str = "libdot";
