//! Configuration
//!
//! ```yaml
//! builtin_paths:
//!   - golang.org/x/net
//! ```

use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Config {
    /// Import paths (and everything below them) treated as standard
    /// library, on top of dotless paths such as `net/http`
    #[facet(default)]
    pub builtin_paths: Vec<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        facet_yaml::from_str(yaml).wrap_err("Failed to parse config YAML")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            eyre::bail!("Config file not found at {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load config if it exists, otherwise the default
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| Self::from_yaml(&content).ok())
            .unwrap_or_default()
    }

    pub fn is_builtin_path(&self, path: &str) -> bool {
        is_standard_library(path)
            || self.builtin_paths.iter().any(|prefix| {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }

    /// Grouping key for a package: the bare path for builtin packages,
    /// `path@version` otherwise
    pub fn clean_path_version(&self, path: &str, version: &str) -> String {
        if self.is_builtin_path(path) {
            path.to_string()
        } else {
            format!("{path}@{version}")
        }
    }
}

/// Standard library import paths have no dot in their first element
pub fn is_standard_library(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    !first.is_empty() && !first.contains('.')
}
