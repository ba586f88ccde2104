//! Error types for pdack operations.
//!
//! This module defines [`PdackError`], the error enum for everything that is
//! not a remote API call: configuration, local I/O and timestamp parsing.
//! Configuration errors are fatal at startup and carry guidance for the user.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`PdackError`].
pub type Result<T> = std::result::Result<T, PdackError>;

/// Error type for local pdack operations.
#[derive(Debug, Error)]
pub enum PdackError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Missing required configuration field
    #[error("{field} not found in config")]
    ConfigMissingField { field: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// Incident timestamp could not be parsed
    #[error("Invalid timestamp '{value}': {message}")]
    TimestampParse { value: String, message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in pdack)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PdackError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a ConfigMissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::ConfigMissingField {
            field: field.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigValidation { .. }
                | Self::ConfigMissingField { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => Some(
                "Create ~/.config/pagerduty_tui.yaml with `pagerduty_api_key: <key>` and `pagerduty_domain: <org>`",
            ),
            Self::ConfigInvalid { .. } => Some("Check the YAML syntax of the config file"),
            Self::ConfigMissingField { .. } => {
                Some("Add a PagerDuty API key under `pagerduty_api_key`")
            }
            Self::DirectoryCreation { .. } => Some("Check permissions, or pass --log-dir"),
            _ => None,
        }
    }
}
