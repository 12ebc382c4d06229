/// Structured error types for ventdir-core.
///
/// Uses `thiserror` so the server and ETL crates can match on variants.
/// Binary crates (ventdir-cli) still use `anyhow` for convenience.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ventdir-core operations
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Clock time string could not be parsed ("07:00 PM", "19:00")
    #[error("Invalid time '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    /// Unknown IANA time zone name
    #[error("Unknown time zone '{name}'")]
    UnknownTimeZone { name: String },

    /// Value outside of an accepted enum (business status, image type...)
    #[error("Invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },

    /// Image delivery is not configured (missing account hash)
    #[error("Cloudflare Images account hash not configured")]
    MissingAccountHash,

    /// Configuration file could not be read
    #[error("Failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML
    #[error("Failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Configuration file could not be written
    #[error("Failed to write config {path:?}: {source}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration value is missing or invalid
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for ventdir-core operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

impl DirectoryError {
    /// Create an invalid time error
    pub fn invalid_time(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid variant error
    pub fn invalid_variant(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidVariant {
            field,
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
