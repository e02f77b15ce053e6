// Helperbin Infrastructure - System Adapters
// Implements: ProcessRunner

pub mod process_runner;

pub use process_runner::TokioProcessRunner;
