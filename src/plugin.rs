//! Plugin call-sites.
//!
//! Templates may name plugins with arguments. The core forwards those calls to
//! a [`PluginHost`]; it never runs plugin code itself.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;

use crate::config::PluginEntry;
use crate::error::Result;

pub trait PluginHost {
    fn invoke(&self, name: &str, arguments: &[Value]) -> Result<()>;
}

/// Host that checks calls against the configured plugin registry.
pub struct RegisteredPlugins<'a> {
    registry: &'a IndexMap<String, PluginEntry>,
}

impl<'a> RegisteredPlugins<'a> {
    pub fn new(registry: &'a IndexMap<String, PluginEntry>) -> Self {
        Self { registry }
    }
}

impl PluginHost for RegisteredPlugins<'_> {
    fn invoke(&self, name: &str, arguments: &[Value]) -> Result<()> {
        match self.registry.get(name) {
            None => warn!("Plugin '{name}' is not installed, skipping"),
            Some(entry) if !entry.activated => debug!("Plugin '{name}' is deactivated, skipping"),
            Some(entry) => info!(
                "Plugin '{}' ({}) requested with {} argument(s)",
                name,
                entry.path,
                arguments.len()
            ),
        }
        Ok(())
    }
}
