//! Tool settings loader
//!
//! Defaults for parsing and formatting are read from `ngxclair.toml`.
//! Command-line flags override whatever is loaded here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file name searched for in the working and user config directories
pub const SETTINGS_FILE: &str = "ngxclair.toml";

/// Root settings document
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Parser defaults
    #[serde(default)]
    pub parse: ParseSettings,

    /// Builder defaults
    #[serde(default)]
    pub format: FormatSettings,
}

/// `[parse]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSettings {
    pub strict: bool,
    pub check_ctx: bool,
    pub check_args: bool,
    pub comments: bool,
    pub combine: bool,
    pub single_file: bool,
    /// Directives dropped from the parsed tree
    pub ignore: Vec<String>,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            strict: false,
            check_ctx: true,
            check_args: true,
            comments: false,
            combine: false,
            single_file: false,
            ignore: Vec::new(),
        }
    }
}

/// `[format]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSettings {
    /// Spaces per nesting level
    pub indent: usize,
    /// Indent with one tab per level instead of spaces
    pub tabs: bool,
    /// Prefix built output with the provenance banner
    pub header: bool,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            indent: 4,
            tabs: false,
            header: false,
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or search the default locations.
    ///
    /// An explicit path must exist. When searching, a missing file is not an
    /// error and yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                tracing::debug!("Loading settings from {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Candidate locations, in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("ngxclair").join(SETTINGS_FILE));
        }
        paths
    }

    /// Load settings from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Settings(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML settings
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Settings(format!("invalid TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.parse.check_ctx);
        assert_eq!(settings.format.indent, 4);
    }

    #[test]
    fn test_partial_tables() {
        let settings = Settings::from_toml(
            r#"
            [parse]
            strict = true
            ignore = ["lua_package_path"]

            [format]
            tabs = true
            "#,
        )
        .unwrap();

        assert!(settings.parse.strict);
        assert!(settings.parse.check_args);
        assert_eq!(settings.parse.ignore, vec!["lua_package_path".to_string()]);
        assert!(settings.format.tabs);
        assert_eq!(settings.format.indent, 4);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Settings::from_toml("[parse]\nstrictness = 1\n");
        assert!(matches!(result, Err(Error::Settings(_))));
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[format]\nindent = 2\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.format.indent, 2);

        let missing = Settings::load(Some(&dir.path().join("nope.toml")));
        assert!(missing.is_err());
    }
}
