// Port Layer - Interfaces for external dependencies

pub mod process_runner;
pub mod time_provider;

// Re-exports
pub use process_runner::{ProcessOutput, ProcessRunner, ProcessSpec, RunnerError};
pub use time_provider::TimeProvider;
