//! Core error types for listing-harvest.
//!
//! Artifact and configuration failures are represented here so every stage
//! reports them the same way.

use std::path::PathBuf;
use thiserror::Error;

/// Central error type for artifact and data-model operations.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// An artifact a stage depends on has not been produced
    #[error("artifact not found at {}", path.display())]
    MissingArtifact {
        /// Path where the artifact was expected
        path: PathBuf,
    },

    /// JSON encoding or decoding of an artifact failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `HarvestError`.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
