//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`crate::artwork::ArtworkError`], [`crate::config::ConfigError`]);
//! this module aggregates them for unified handling, and CLI/main uses
//! `anyhow` for convenient propagation.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artwork resolution error
    #[error("Artwork error: {0}")]
    Artwork(#[from] crate::artwork::ArtworkError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Invalid user input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::ArtworkError;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/roms/missing.zip");
        assert!(err.to_string().contains("/roms/missing.zip"));
    }

    #[test]
    fn test_artwork_error_converts() {
        let err: Error = ArtworkError::RateLimited.into();
        assert!(matches!(err, Error::Artwork(_)));
    }
}
