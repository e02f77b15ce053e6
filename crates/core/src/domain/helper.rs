// Helper Program Domain Model

use std::path::{Component, Path, PathBuf};

use super::error::{LaunchError, Result};

/// Platform executable suffix appended during resolution ("" on Unix, ".exe" on Windows)
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// A helper program bound to the directory it ships in.
///
/// The binding is immutable and owns no state beyond its two attributes.
/// Resolution only ever looks inside `base_directory`; `PATH` is never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperProgram {
    base_directory: PathBuf,
    program_name: String,
    explicit_path: Option<PathBuf>,
}

impl HelperProgram {
    /// Bind `program_name` to `base_directory`
    ///
    /// `base_directory` does not need to exist yet; existence is checked at
    /// invocation time.
    ///
    /// # Errors
    /// - LaunchError::InvalidName if the name is empty or is not a single path component
    pub fn new(base_directory: impl Into<PathBuf>, program_name: impl Into<String>) -> Result<Self> {
        let program_name = program_name.into();
        validate_name(&program_name)?;

        Ok(Self {
            base_directory: base_directory.into(),
            program_name,
            explicit_path: None,
        })
    }

    /// Bind a logical name to an exact executable path.
    ///
    /// The path is used verbatim (no suffix handling). `base_directory` becomes
    /// the path's parent.
    pub fn with_path(program_name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let program_name = program_name.into();
        validate_name(&program_name)?;

        let path = path.into();
        let base_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(Self {
            base_directory,
            program_name,
            explicit_path: Some(path),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Resolve the concrete executable path
    ///
    /// Deterministic given `(base_directory, program_name)`:
    /// `base_directory/program_name` plus the platform suffix, unless the
    /// name already carries it.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return path.clone();
        }

        self.base_directory.join(executable_file_name(&self.program_name))
    }
}

impl std::fmt::Display for HelperProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.program_name, self.resolve().display())
    }
}

fn executable_file_name(program_name: &str) -> String {
    if EXE_SUFFIX.is_empty() || program_name.ends_with(EXE_SUFFIX) {
        program_name.to_string()
    } else {
        format!("{program_name}{EXE_SUFFIX}")
    }
}

/// A name must stay inside the bound directory: exactly one normal component
fn validate_name(program_name: &str) -> Result<()> {
    if program_name.is_empty() {
        return Err(LaunchError::InvalidName(
            "program name must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(program_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !program_name.contains(['/', '\\']) => Ok(()),
        _ => Err(LaunchError::InvalidName(format!(
            "'{program_name}' must be a single file name"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_base_and_name() {
        let helper = HelperProgram::new("/tools", "fonts").unwrap();
        let expected = PathBuf::from("/tools").join(format!("fonts{EXE_SUFFIX}"));

        assert_eq!(helper.resolve(), expected);
        assert_eq!(helper.program_name(), "fonts");
        assert_eq!(helper.base_directory(), Path::new("/tools"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let a = HelperProgram::new("/tools", "mkdeps").unwrap();
        let b = HelperProgram::new("/tools", "mkdeps").unwrap();

        assert_eq!(a.resolve(), b.resolve());
        assert_eq!(a, b);
    }

    #[test]
    fn test_suffix_not_duplicated() {
        let name = format!("plugin{EXE_SUFFIX}");
        let helper = HelperProgram::new("/tools", name.clone()).unwrap();

        assert_eq!(helper.resolve(), PathBuf::from("/tools").join(name));
    }

    #[test]
    fn test_missing_directory_is_accepted() {
        let helper = HelperProgram::new("/definitely/not/installed/yet", "fonts");
        assert!(helper.is_ok());
    }

    #[test]
    fn test_rejects_invalid_names() {
        for name in ["", "a/b", "..", ".", "/abs", "dir\\prog"] {
            let result = HelperProgram::new("/tools", name);
            assert!(
                matches!(result, Err(LaunchError::InvalidName(_))),
                "name {name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_explicit_path_is_verbatim() {
        let helper = HelperProgram::with_path("plugin", "/opt/plugin/run.sh").unwrap();

        assert_eq!(helper.resolve(), PathBuf::from("/opt/plugin/run.sh"));
        assert_eq!(helper.base_directory(), Path::new("/opt/plugin"));
    }
}
