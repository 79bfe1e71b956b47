//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid geotag: {0}")]
    InvalidGeoTag(String),

    #[error("unrecognized sound type: {0}")]
    UnknownSoundType(String),

    #[error("invalid filename: {0}")]
    InvalidFilename(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
