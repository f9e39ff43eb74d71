//! Core error types for smartpharma-core.
//!
//! The adherence engine itself never fails: malformed records are skipped.
//! These errors cover the edges around it (document ingestion, configuration
//! I/O and validation of new intake entries).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for smartpharma-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Home directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised when a whole document batch cannot be read.
///
/// Individual malformed records never produce one of these.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Top-level JSON was neither an array nor a `{ "documents": [...] }` object
    #[error("Expected a JSON array or an object with a 'documents' array, got {0}")]
    UnexpectedShape(&'static str),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No reminder with this id
    #[error("Reminder '{0}' not found")]
    UnknownReminder(String),

    /// Reminder belongs to a different user
    #[error("Reminder '{reminder_id}' does not belong to user '{user_id}'")]
    ForeignReminder { reminder_id: String, user_id: String },

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Dose slot already logged on this calendar day
    #[error("Dose {time_index} of reminder '{reminder_id}' already logged on {date}")]
    AlreadyLogged {
        reminder_id: String,
        time_index: usize,
        date: chrono::NaiveDate,
    },

    /// Reminder is not active at the given instant
    #[error("Reminder '{0}' is not active")]
    InactiveReminder(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_and_displays() {
        let err: CoreError = ValidationError::UnknownReminder("rem-9".into()).into();
        assert_eq!(err.to_string(), "Validation error: Reminder 'rem-9' not found");
    }

    #[test]
    fn config_error_converts() {
        let err: CoreError = ConfigError::UnknownKey("progress.nope".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
        assert_eq!(err.to_string(), "Configuration error: unknown config key: progress.nope");
    }
}
