// Install layout discovery, performed once at program entry
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a tool and its sibling projects live
///
/// Conventional layout: `<root>/<project>/bin/<program>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root_dir: PathBuf,
    pub project_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl InstallLayout {
    /// Derive the layout from a program living in `<root>/<project>/bin/`
    ///
    /// # Errors
    /// - AppError::Config if `program` has fewer than three ancestors
    pub fn from_program_path(program: &Path) -> Result<Self> {
        let bin_dir = parent_of(program)?;
        let project_dir = parent_of(&bin_dir)?;
        let root_dir = parent_of(&project_dir)?;

        Ok(Self {
            root_dir,
            project_dir,
            bin_dir,
        })
    }

    /// Layout rooted at a known project directory: helpers in `<project>/bin`
    pub fn from_project_dir(project_dir: &Path) -> Result<Self> {
        Ok(Self {
            root_dir: parent_of(project_dir)?,
            project_dir: project_dir.to_path_buf(),
            bin_dir: project_dir.join("bin"),
        })
    }

    /// Layout for tools kept directly in a project directory (no `bin/`)
    pub fn from_flat_dir(project_dir: &Path) -> Result<Self> {
        Ok(Self {
            root_dir: parent_of(project_dir)?,
            project_dir: project_dir.to_path_buf(),
            bin_dir: project_dir.to_path_buf(),
        })
    }

    /// Locate the running executable and derive its layout
    ///
    /// Symlinks are resolved so the layout reflects the real install.
    pub fn discover() -> Result<Self> {
        let exe = std::env::current_exe()?.canonicalize()?;
        debug!(exe = %exe.display(), "Discovering install layout");
        Self::from_program_path(&exe)
    }

    /// `bin/` directory of a sibling project under the same root
    pub fn shared_bin_dir(&self, project: &str) -> PathBuf {
        self.root_dir.join(project).join("bin")
    }
}

fn parent_of(path: &Path) -> Result<PathBuf> {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            AppError::Config(format!(
                "cannot derive install layout: '{}' has no parent directory",
                path.display()
            ))
        })
}
