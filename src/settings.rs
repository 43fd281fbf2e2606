//! Client-local settings, kept apart from the link directory.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::template::FormatTemplate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Output template applied to every resolved mention.
    #[serde(default)]
    pub format: FormatTemplate,
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.try_exists().unwrap_or(false) {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse settings file: {}", path.display()))
    }

    /// Writes settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .context(format!("Failed to write settings file: {}", path.display()))?;
        debug!("Saved settings to {}", path.display());

        Ok(())
    }
}
