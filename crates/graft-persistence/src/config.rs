//! Persistence configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by the codec and the save path.
///
/// Every key is optional in a config file; missing keys take their defaults.
///
/// ```toml
/// xml_declaration = true
/// indent = 2
/// temp_extension = "tmp"
/// sync_on_save = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Write `<?xml ...?>` ahead of the root element.
    pub xml_declaration: bool,

    /// Indentation width for nested elements; `0` writes one line.
    pub indent: usize,

    /// Extension of the temporary sibling a save writes before renaming.
    pub temp_extension: String,

    /// Flush the temporary file to disk before it replaces the target.
    pub sync_on_save: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: 2,
            temp_extension: "tmp".to_string(),
            sync_on_save: true,
        }
    }
}

impl PersistenceConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Temp extension with any leading dot removed; falls back to `tmp` when blank.
    pub(crate) fn effective_temp_extension(&self) -> &str {
        let trimmed = self.temp_extension.trim().trim_start_matches('.');
        if trimmed.is_empty() { "tmp" } else { trimmed }
    }
}
