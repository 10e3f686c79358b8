//! Configuration handling for Dédale.
//! The configuration is read once per invocation and never modified by the
//! scaffolding core; a copy is written into every initialised project.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE;
use crate::error::{Error, Result};

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Template used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_template: Option<String>,

    /// Default modules provider url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    pub providers: IndexMap<String, String>,
    pub auto_update: bool,
    pub notify_update: bool,

    /// Installed plugins and their activation status
    pub plugins: IndexMap<String, PluginEntry>,

    pub auto_upgrade: bool,
    pub notify_upgrade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub path: String,
    #[serde(default = "activated_by_default")]
    pub activated: bool,
}

fn activated_by_default() -> bool {
    true
}

impl Config {
    /// Loads the configuration file at `path`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the file is missing or is not a valid configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ConfigError(format!(
                "no configuration file at '{}'",
                path.display()
            )));
        }
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("invalid configuration '{}': {}", path.display(), e))
        })
    }

    /// Writes this configuration as `.dedale.json` inside `dir`.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        debug!("Configuration written to {}", path.display());
        Ok(path)
    }
}
