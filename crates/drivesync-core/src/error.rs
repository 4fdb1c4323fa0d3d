//! Error types for drivesync-core

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using drivesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drivesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authorization error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Remote storage API error
    #[error("Remote storage error: {0}")]
    Remote(String),

    /// Configuration error, detected before any remote interaction
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid glob pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Listing returned a record without a size field
    #[error("Remote file {0} did not report a size")]
    MissingRemoteSize(String),

    /// Local path has no usable file name
    #[error("Path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
}
