//! Dédale initialises projects from templates.
//! A template declares arguments; each resolved argument is matched against
//! patterns whose actions reshape the project directory.

/// File actions (remove / create / move) applied to a project directory
pub mod actions;

/// Command-line interface module for the Dédale application
pub mod cli;

/// Configuration handling (`.dedale.json`)
pub mod config;

/// Common constants
pub mod constants;

/// Mutable evaluation context of a scaffold session
pub mod context;

/// Error types and handling for the Dédale application
pub mod error;

/// Template file sets: static copies and `use` inheritance
pub mod fileset;

/// Hooks run once a project is initialised
pub mod hooks;

/// Template definition loading and substitution
pub mod loader;

/// Pattern matching of argument values
pub mod matcher;

/// Plugin call-site forwarding
pub mod plugin;

/// Scaffold session orchestration
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// `$variable.path` resolution
pub mod resolver;

/// Session layout and project identity
pub mod session;

/// Template data model
pub mod template;
