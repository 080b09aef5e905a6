//! CLI-specific error types and mappings.
//!
//! Errors from the core, database and runtime crates are folded into
//! [`CliError`], which decides the process exit code.

use murmur_core::{ChatError, PathError, SettingsError, SettingsStoreError, StoreError};
use murmur_runtime::RuntimeError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The named conversation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The model server could not be used.
    #[error("Model error: {0}")]
    Model(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(_) => 1,
            CliError::Arguments(_) => 2, // EX_USAGE
            CliError::NotFound(_) => 66, // EX_NOINPUT
            CliError::Model(_) => 69,    // EX_UNAVAILABLE
            CliError::Database(_) => 73, // EX_CANTCREAT (closest fit)
            CliError::Io(_) => 74,       // EX_IOERR
            CliError::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConversationNotFound(_) => CliError::NotFound(err.to_string()),
            StoreError::AlreadyExists(_) | StoreError::Corrupt(_) | StoreError::Database(_) => {
                CliError::Database(err.to_string())
            }
        }
    }
}

impl From<SettingsStoreError> for CliError {
    fn from(err: SettingsStoreError) -> Self {
        CliError::Database(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::UnknownKey(_) => CliError::Arguments(err.to_string()),
            _ => CliError::Config(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<RuntimeError> for CliError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::InvalidModelUrl { .. } => CliError::Config(err.to_string()),
            RuntimeError::Client(_) => CliError::Model(err.to_string()),
        }
    }
}

impl From<ChatError> for CliError {
    fn from(err: ChatError) -> Self {
        CliError::Core(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
///
/// Errors that never passed through [`CliError`] exit with 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
