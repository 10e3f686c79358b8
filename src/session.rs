//! Session layout: where Dédale keeps its files and which project is being
//! initialised. Built once by the binary and passed down explicitly.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILE, DEDALE_DIR, PLUGINS_DIR, TEMPLATES_DIR};
use crate::error::{Error, Result};

static PROJECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+$").expect("project name grammar is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub home: PathBuf,
    /// `~/.dedale`
    pub root: PathBuf,
    pub templates: PathBuf,
    pub plugins: PathBuf,
    /// `~/.dedale/.dedale.json`
    pub config: PathBuf,
}

impl Session {
    pub fn from_home<P: AsRef<Path>>(home: P) -> Self {
        let home = home.as_ref().to_path_buf();
        let root = home.join(DEDALE_DIR);
        Self {
            templates: root.join(TEMPLATES_DIR),
            plugins: root.join(PLUGINS_DIR),
            config: root.join(CONFIG_FILE),
            root,
            home,
        }
    }

    /// Builds the session of the current user.
    pub fn discover() -> Result<Self> {
        dirs::home_dir()
            .map(Self::from_home)
            .ok_or_else(|| Error::ConfigError("unable to find home directory".to_string()))
    }

    /// A `.dedale.json` in `cwd` wins over the user-wide configuration.
    pub fn config_path<P: AsRef<Path>>(&self, cwd: P) -> PathBuf {
        let local = cwd.as_ref().join(CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            self.config.clone()
        }
    }
}

/// The project being initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub directory: PathBuf,
}

impl Project {
    /// Uses `name` when it is a single word, otherwise the directory name.
    pub fn new<P: AsRef<Path>>(name: Option<&str>, directory: P) -> Self {
        let directory = directory.as_ref().to_path_buf();
        let name = match name {
            Some(name) if PROJECT_NAME.is_match(name) => name.to_string(),
            _ => directory
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string(),
        };
        Self { name, directory }
    }
}
