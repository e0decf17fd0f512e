//! Error types for the precompress CLI.

use precompress_core::PrecompressError;
use std::fmt;
use std::path::PathBuf;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// Config file could not be read
    ConfigFile(PathBuf, std::io::Error),

    /// Configuration error
    Config(String),

    /// Setup failure reported by the compressor
    Precompress(PrecompressError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigFile(path, e) => {
                write!(f, "Cannot read config file {}: {}", path.display(), e)
            }
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Precompress(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PrecompressError> for CliError {
    fn from(e: PrecompressError) -> Self {
        CliError::Precompress(e)
    }
}
