//! Configuration loading
//!
//! Layers, lowest to highest priority:
//! 1. built-in defaults
//! 2. `<config_dir>/helperbin/config.toml` (optional)
//! 3. `--config FILE` (required when given)
//! 4. `HELPERBIN_*` environment variables (`HELPERBIN_HELPERS` is comma-separated)
//!
//! Files are always read as TOML, whatever their extension.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use helperbin_core::application::constants::DEFAULT_SHARED_PROJECT;
use helperbin_core::application::DEFAULT_HELPERS;

const ENV_PREFIX: &str = "HELPERBIN";
const CONFIG_FILE_NAME: &str = "config.toml";

/// How `project_dir` maps to the helper directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Helpers in `<project_dir>/bin`
    #[default]
    Bin,
    /// Helpers directly in `<project_dir>`
    Flat,
}

/// Launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HelperbinConfig {
    /// Project directory override
    pub project_dir: Option<String>,
    /// Layout of `project_dir`
    pub layout: LayoutKind,
    /// Helper directory override
    pub bin_dir: Option<String>,
    /// Helpers to register
    pub helpers: Vec<String>,
    /// Sibling project holding shared helpers
    pub shared_project: String,
}

impl Default for HelperbinConfig {
    fn default() -> Self {
        Self {
            project_dir: None,
            layout: LayoutKind::Bin,
            bin_dir: None,
            helpers: DEFAULT_HELPERS.iter().map(|s| s.to_string()).collect(),
            shared_project: DEFAULT_SHARED_PROJECT.to_string(),
        }
    }
}

impl HelperbinConfig {
    /// Load from the user config file, `explicit`, and the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(default_config_file(), explicit, environment())
    }

    fn load_from(
        user_file: Option<PathBuf>,
        explicit: Option<&Path>,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = user_file {
            builder = builder.add_source(toml_file(&path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(toml_file(path).required(true));
        }

        builder
            .add_source(env)
            .build()
            .and_then(|config| config.try_deserialize::<Self>())
            .context("Failed to load configuration")
    }

    pub fn project_dir(&self) -> Option<PathBuf> {
        self.project_dir.as_deref().map(expand)
    }

    pub fn bin_dir(&self) -> Option<PathBuf> {
        self.bin_dir.as_deref().map(expand)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("helpers")
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "helperbin").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = HelperbinConfig::load_from(None, None, env_from(&[])).unwrap();

        assert_eq!(config, HelperbinConfig::default());
        assert_eq!(config.helpers.len(), 4);
        assert_eq!(config.shared_project, "libdot");
        assert_eq!(config.layout, LayoutKind::Bin);
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("helperbin.toml");
        std::fs::write(
            &file,
            "bin_dir = \"/opt/tools\"\nhelpers = [\"fonts\"]\nshared_project = \"common\"\n",
        )
        .unwrap();

        let config = HelperbinConfig::load_from(
            None,
            Some(&file),
            env_from(&[("HELPERBIN_SHARED_PROJECT", "libdot2")]),
        )
        .unwrap();

        assert_eq!(config.bin_dir(), Some(PathBuf::from("/opt/tools")));
        assert_eq!(config.helpers, vec!["fonts".to_string()]);
        assert_eq!(config.shared_project, "libdot2");
    }

    #[test]
    fn test_explicit_file_is_toml_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("helperbin.conf");
        std::fs::write(&file, "project_dir = \"/src/libapps/nassh\"\nlayout = \"flat\"\n").unwrap();

        let config = HelperbinConfig::load_from(None, Some(&file), env_from(&[])).unwrap();

        assert_eq!(config.project_dir(), Some(PathBuf::from("/src/libapps/nassh")));
        assert_eq!(config.layout, LayoutKind::Flat);
    }

    #[test]
    fn test_layout_from_env() {
        let config =
            HelperbinConfig::load_from(None, None, env_from(&[("HELPERBIN_LAYOUT", "flat")])).unwrap();

        assert_eq!(config.layout, LayoutKind::Flat);
    }

    #[test]
    fn test_env_helper_list() {
        let config = HelperbinConfig::load_from(
            None,
            None,
            env_from(&[("HELPERBIN_HELPERS", "fonts,plugin")]),
        )
        .unwrap();

        assert_eq!(config.helpers, vec!["fonts".to_string(), "plugin".to_string()]);
    }

    #[test]
    fn test_missing_user_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = HelperbinConfig::load_from(
            Some(dir.path().join("absent.toml")),
            None,
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(config, HelperbinConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");

        assert!(HelperbinConfig::load_from(None, Some(&absent), env_from(&[])).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let config = HelperbinConfig {
            project_dir: Some("~/libapps/nassh".to_string()),
            ..Default::default()
        };

        let expanded = config.project_dir().unwrap();
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("libapps/nassh"));
    }
}
