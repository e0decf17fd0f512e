//! Error types for precompression

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while precompressing a tree
#[derive(Error, Debug)]
pub enum PrecompressError {
    /// IO error while reading a source or writing a destination
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed during traversal
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid compression level
    #[error("Invalid compression level for {0}: {1} (must be between {2} and {3})")]
    InvalidLevel(String, u32, u32, u32),

    /// Algorithm is not compiled in or its encoder failed the startup check
    #[error("Unsupported compression algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PrecompressError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
