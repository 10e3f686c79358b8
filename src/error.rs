//! Error handling for the Dédale application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for Dédale operations.
///
/// Casting errors are the only recoverable kind: the driver re-prompts on them.
/// Everything else aborts the current session and leaves the target directory
/// as it was when the failure happened.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The template definition does not have the expected shape
    #[error("Malformed template '{template}': {reason}.")]
    MalformedTemplate { template: String, reason: String },

    /// A `$variable.path` reference could not be resolved against the context
    #[error("Cannot resolve '{reference}': {reason}.")]
    ResolutionError { reference: String, reason: String },

    /// A file action was ambiguous or failed
    #[error("Action error: {0}.")]
    ActionError(String),

    /// User input does not parse to the declared argument type
    #[error("Cannot cast '{input}' to {expected}: {reason}.")]
    CastError { input: String, expected: String, reason: String },

    /// The user declined to answer a prompt
    #[error("Initialisation aborted by user.")]
    UserAbort,

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Template '{name}' does not exist in '{templates_dir}'.")]
    TemplateDoesNotExistError { name: String, templates_dir: String },

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),
}

impl Error {
    /// Shorthand for [`Error::MalformedTemplate`].
    pub fn malformed<T: Into<String>, R: ToString>(template: T, reason: R) -> Self {
        Error::MalformedTemplate { template: template.into(), reason: reason.to_string() }
    }

    /// Whether the driver may ask the user again instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::CastError { .. })
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
