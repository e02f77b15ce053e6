// Helperbin Core - Domain Logic & Ports
// NO process spawning here; the subprocess primitive lives in infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{launcher_factory, HelperRegistry, InstallLayout};
pub use domain::{HelperProgram, InvocationOutcome, InvokeOptions, LaunchError, OutputMode};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
