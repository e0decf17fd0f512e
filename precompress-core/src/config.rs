//! Configuration for a precompression run

use crate::{Algorithm, PrecompressError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Suffixes compressed when none are configured
pub const DEFAULT_INCLUDE_SUFFIXES: [&str; 8] = [
    ".css", ".js", ".svg", ".txt", ".md", ".html", ".xml", ".json",
];

/// Files strictly smaller than this are never compressed
pub const DEFAULT_MIN_SIZE: u64 = 2;

/// What to do with the remaining algorithms of a file once one candidate
/// has been discarded for not shrinking the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscardPolicy {
    /// Keep going with the next configured algorithm
    #[default]
    NextAlgorithm,

    /// Stop processing the file altogether
    SkipFile,
}

impl FromStr for DiscardPolicy {
    type Err = PrecompressError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "next-algorithm" | "next_algorithm" | "continue" => Ok(Self::NextAlgorithm),
            "skip-file" | "skip_file" | "stop" => Ok(Self::SkipFile),
            other => Err(PrecompressError::Config(format!(
                "unknown discard policy: {}",
                other
            ))),
        }
    }
}

/// Configuration for a precompression run
#[derive(Debug, Clone)]
pub struct PrecompressConfig {
    /// Root directory to scan
    pub input_dir: PathBuf,

    /// Root directory artifacts are written under, mirroring `input_dir`
    pub output_dir: PathBuf,

    /// Exact, case-sensitive file name suffixes eligible for compression
    pub include_suffixes: Vec<String>,

    /// Algorithms to run, in per-file processing order
    pub algorithms: Vec<Algorithm>,

    /// Minimum source size in bytes (default: 2)
    pub min_size: u64,

    /// Gzip level, 1-9 (default: 6)
    pub gzip_level: u32,

    /// Brotli quality, 0-11 (default: 11)
    pub brotli_level: u32,

    /// Behaviour after a candidate is discarded
    pub discard_policy: DiscardPolicy,
}

impl Default for PrecompressConfig {
    fn default() -> Self {
        let classes = Path::new("target").join("classes");
        Self {
            input_dir: classes.clone(),
            output_dir: classes,
            include_suffixes: default_include_suffixes(),
            algorithms: Algorithm::ALL.to_vec(),
            min_size: DEFAULT_MIN_SIZE,
            gzip_level: Algorithm::Gzip.default_level(),
            brotli_level: Algorithm::Brotli.default_level(),
            discard_policy: DiscardPolicy::default(),
        }
    }
}

impl PrecompressConfig {
    /// Create a builder for configuration
    pub fn builder() -> PrecompressConfigBuilder {
        PrecompressConfigBuilder::new()
    }

    /// Compression level configured for `algorithm`
    pub fn level_for(&self, algorithm: Algorithm) -> u32 {
        match algorithm {
            Algorithm::Gzip => self.gzip_level,
            Algorithm::Brotli => self.brotli_level,
        }
    }

    /// Check the levels of every enabled algorithm.
    pub fn validate(&self) -> Result<()> {
        for algorithm in &self.algorithms {
            algorithm.validate_level(self.level_for(*algorithm))?;
        }
        Ok(())
    }

    /// Check if a file name ends with one of the configured suffixes
    pub fn matches_suffix(&self, file_name: &str) -> bool {
        self.include_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }

    /// Check if a file is large enough to be compressed
    pub fn meets_min_size(&self, len: u64) -> bool {
        len > 0 && len >= self.min_size
    }
}

/// Builder for PrecompressConfig
#[derive(Debug, Clone, Default)]
pub struct PrecompressConfigBuilder {
    config: PrecompressConfig,
}

impl PrecompressConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: PrecompressConfig::default(),
        }
    }

    /// Set both the input and output directory
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.config.input_dir = dir.clone();
        self.config.output_dir = dir;
        self
    }

    /// Set the input directory
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the included suffixes
    pub fn include_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.include_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Add an included suffix
    pub fn add_include_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.include_suffixes.push(suffix.into());
        self
    }

    /// Set the algorithms and their order
    pub fn algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.config.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Set the minimum source size
    pub fn min_size(mut self, min_size: u64) -> Self {
        self.config.min_size = min_size;
        self
    }

    /// Set the gzip level
    pub fn gzip_level(mut self, level: u32) -> Self {
        self.config.gzip_level = level;
        self
    }

    /// Set the brotli quality
    pub fn brotli_level(mut self, level: u32) -> Self {
        self.config.brotli_level = level;
        self
    }

    /// Set the discard policy
    pub fn discard_policy(mut self, policy: DiscardPolicy) -> Self {
        self.config.discard_policy = policy;
        self
    }

    /// Use gzip only
    pub fn gzip(mut self) -> Self {
        self.config.algorithms = vec![Algorithm::Gzip];
        self
    }

    /// Use brotli only
    pub fn brotli(mut self) -> Self {
        self.config.algorithms = vec![Algorithm::Brotli];
        self
    }

    /// Build the configuration
    pub fn build(self) -> PrecompressConfig {
        self.config
    }
}

/// Default suffixes that should be compressed
pub fn default_include_suffixes() -> Vec<String> {
    DEFAULT_INCLUDE_SUFFIXES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
