//! Process-wide initialization: layout, helper directory, registry
//!
//! Runs once at entry; everything it builds is read-only afterwards.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use helperbin_core::application::{launcher_factory, HelperRegistry, InstallLayout};
use helperbin_core::HelperProgram;

use crate::settings::{HelperbinConfig, LayoutKind};

pub struct Bootstrap {
    pub layout: Option<InstallLayout>,
    pub helper_dir: PathBuf,
    pub shared_project: String,
    pub registry: HelperRegistry,
}

impl Bootstrap {
    /// Helper directory precedence: `bin_dir_override` > config `bin_dir` > layout `bin_dir`
    pub fn init(config: &HelperbinConfig, bin_dir_override: Option<&Path>) -> Result<Self> {
        let layout = match config.project_dir() {
            Some(dir) => Some(match config.layout {
                LayoutKind::Bin => InstallLayout::from_project_dir(&dir)?,
                LayoutKind::Flat => InstallLayout::from_flat_dir(&dir)?,
            }),
            None => match InstallLayout::discover() {
                Ok(layout) => Some(layout),
                Err(e) => {
                    debug!(error = %e, "Install layout not discoverable");
                    None
                }
            },
        };

        let helper_dir = bin_dir_override
            .map(Path::to_path_buf)
            .or_else(|| config.bin_dir())
            .or_else(|| layout.as_ref().map(|l| l.bin_dir.clone()))
            .ok_or_else(|| anyhow!("Cannot determine helper directory; set --bin-dir"))?;

        let registry = HelperRegistry::build(launcher_factory(&helper_dir), &config.helpers)
            .context("Invalid helper name in configuration")?;

        info!(
            helper_dir = %helper_dir.display(),
            helpers = registry.len(),
            "Helper registry ready"
        );

        Ok(Self {
            layout,
            helper_dir,
            shared_project: config.shared_project.clone(),
            registry,
        })
    }

    /// Registered helper, or a helper from the shared project's `bin/`
    pub fn helper(&self, name: &str, shared: bool) -> Result<HelperProgram> {
        if !shared {
            return Ok(self.registry.get(name)?.clone());
        }

        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| anyhow!("Shared helpers need a known install layout"))?;
        let make = launcher_factory(layout.shared_bin_dir(&self.shared_project));
        Ok(make(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_project(dir: &Path) -> HelperbinConfig {
        HelperbinConfig {
            project_dir: Some(dir.to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_dir_drives_layout() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("nassh");

        let boot = Bootstrap::init(&config_with_project(&project), None).unwrap();

        assert_eq!(boot.helper_dir, project.join("bin"));
        assert_eq!(boot.registry.len(), 4);
        let fonts = boot.helper("fonts", false).unwrap();
        assert_eq!(fonts.base_directory(), project.join("bin"));
    }

    #[test]
    fn test_flat_layout_uses_project_dir_directly() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("kokoro");
        let mut config = config_with_project(&project);
        config.layout = LayoutKind::Flat;

        let boot = Bootstrap::init(&config, None).unwrap();

        assert_eq!(boot.helper_dir, project);
        let fonts = boot.helper("fonts", false).unwrap();
        assert_eq!(fonts.base_directory(), project);
        let lint = boot.helper("lint", true).unwrap();
        assert_eq!(lint.base_directory(), root.path().join("libdot").join("bin"));
    }

    #[test]
    fn test_bin_dir_override_wins() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config_with_project(&root.path().join("nassh"));
        config.bin_dir = Some("/from/config".to_string());

        let boot = Bootstrap::init(&config, Some(Path::new("/from/cli"))).unwrap();
        assert_eq!(boot.helper_dir, PathBuf::from("/from/cli"));

        let boot = Bootstrap::init(&config, None).unwrap();
        assert_eq!(boot.helper_dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_shared_helper_resolves_under_shared_project() {
        let root = tempfile::tempdir().unwrap();
        let boot = Bootstrap::init(&config_with_project(&root.path().join("nassh")), None).unwrap();

        let helper = boot.helper("lint", true).unwrap();
        assert_eq!(helper.base_directory(), root.path().join("libdot").join("bin"));
    }

    #[test]
    fn test_unregistered_helper_is_error() {
        let root = tempfile::tempdir().unwrap();
        let boot = Bootstrap::init(&config_with_project(&root.path().join("nassh")), None).unwrap();

        let err = boot.helper("lint", false).unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_invalid_configured_name_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config_with_project(&root.path().join("nassh"));
        config.helpers = vec!["../evil".to_string()];

        assert!(Bootstrap::init(&config, None).is_err());
    }
}
