// Application Layer - Launching, registry and bootstrap

pub mod bootstrap;
pub mod constants;
pub mod launcher;
pub mod registry;

// Re-exports
pub use bootstrap::InstallLayout;
pub use launcher::{display_command, launcher_factory};
pub use registry::{HelperRegistry, DEFAULT_HELPERS};
