// Helper registry: logical name -> launcher, built once at startup
use crate::domain::error::{LaunchError, Result};
use crate::domain::HelperProgram;
use std::collections::BTreeMap;
use tracing::debug;

/// Helpers shipped in a project's `bin/` directory by default
pub const DEFAULT_HELPERS: &[&str] = &["generate-changelog", "fonts", "mkdeps", "plugin"];

/// Read-only table of helper launchers
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, HelperProgram>,
}

impl HelperRegistry {
    /// Build the table by applying `factory` to every name
    ///
    /// Duplicate names are collapsed; the first occurrence wins.
    ///
    /// # Errors
    /// - LaunchError::InvalidName from the factory
    pub fn build<F, S>(factory: F, names: impl IntoIterator<Item = S>) -> Result<Self>
    where
        F: Fn(&str) -> Result<HelperProgram>,
        S: AsRef<str>,
    {
        let mut helpers = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            if helpers.contains_key(name) {
                continue;
            }
            helpers.insert(name.to_string(), factory(name)?);
        }

        debug!(count = helpers.len(), "Helper registry built");
        Ok(Self { helpers })
    }

    /// Look up a helper by logical name
    ///
    /// # Errors
    /// - LaunchError::NotRegistered listing the known names
    pub fn get(&self, name: &str) -> Result<&HelperProgram> {
        self.helpers
            .get(name)
            .ok_or_else(|| LaunchError::NotRegistered {
                name: name.to_string(),
                known: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.helpers.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HelperProgram)> {
        self.helpers.iter().map(|(name, helper)| (name.as_str(), helper))
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}
