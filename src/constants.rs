//! Common constants used throughout the Dédale application.

/// File name of a template definition inside its template directory
pub const TEMPLATE_FILE: &str = "dedale.template.json";

/// File name of the serialized configuration
pub const CONFIG_FILE: &str = ".dedale.json";

/// Dédale's home directory name
pub const DEDALE_DIR: &str = ".dedale";

/// Installed templates, relative to [`DEDALE_DIR`]
pub const TEMPLATES_DIR: &str = "templates";

/// Installed plugins, relative to [`DEDALE_DIR`]
pub const PLUGINS_DIR: &str = "plugins";

/// Context key holding the name of the template being loaded
pub const TEMPLATE_NAME_KEY: &str = "name";
