//! Error types for fleetcheck operations.
//!
//! This module defines [`FleetcheckError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! Failures are scoped to the unit that produced them. Only an unreadable
//! plugin root, configuration errors and invalid invocations are returned to
//! the caller; the other variants are logged where they occur and turned into
//! data (an `ERROR` entry, a skipped hook, an omitted verdict).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fleetcheck operations.
#[derive(Debug, Error)]
pub enum FleetcheckError {
    /// A configured plugin root cannot be read. Fatal: nothing to run.
    #[error("Plugin root is unreadable: {path}")]
    CatalogRootUnreadable { path: PathBuf },

    /// A path below a plugin root could not be inspected.
    #[error("Failed to inspect {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// Plugin header or document could not be parsed.
    #[error("Malformed metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// A unit could not be launched or crashed its launcher.
    #[error("Plugin '{plugin}' could not be executed: {message}")]
    Execution { plugin: String, message: String },

    /// A result hook failed.
    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    /// The results document could not be read or written.
    #[error("Cannot persist results at {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// A comparator failed for one group.
    #[error("Comparator '{comparator}' failed for group '{group}': {message}")]
    Correlation {
        group: String,
        comparator: String,
        message: String,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Invalid command-line invocation.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for fleetcheck operations.
pub type Result<T> = std::result::Result<T, FleetcheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_root_unreadable_displays_path() {
        let err = FleetcheckError::CatalogRootUnreadable {
            path: PathBuf::from("/plugins/missing"),
        };
        assert!(err.to_string().contains("/plugins/missing"));
    }

    #[test]
    fn execution_error_displays_plugin_and_message() {
        let err = FleetcheckError::Execution {
            plugin: "/plugins/core/system/clock.sh".into(),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("clock.sh"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn hook_error_displays_hook_name() {
        let err = FleetcheckError::Hook {
            hook: "expand-aggregate".into(),
            message: "bad pair".into(),
        };
        assert!(err.to_string().contains("expand-aggregate"));
    }

    #[test]
    fn correlation_error_displays_group_and_comparator() {
        let err = FleetcheckError::Correlation {
            group: "release:8.4".into(),
            comparator: "positive-affinity".into(),
            message: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("release:8.4"));
        assert!(msg.contains("positive-affinity"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = FleetcheckError::ConfigParseError {
            path: PathBuf::from("/etc/fleetcheck.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/fleetcheck.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FleetcheckError = io_err.into();
        assert!(matches!(err, FleetcheckError::Io(_)));
    }

    #[test]
    fn json_error_converts_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FleetcheckError = json_err.into();
        assert!(matches!(err, FleetcheckError::Json(_)));
    }
}
