// Domain Layer - Helper bindings and invocation values

pub mod error;
pub mod helper;
pub mod invocation;

// Re-exports
pub use error::LaunchError;
pub use helper::{HelperProgram, EXE_SUFFIX};
pub use invocation::{InvocationOutcome, InvocationStatus, InvokeOptions, OutputMode};
