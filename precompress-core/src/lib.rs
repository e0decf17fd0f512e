//! Static asset precompression
//!
//! This crate walks a directory of build output and writes gzip and brotli
//! siblings next to (or mirrored under another root from) the static assets
//! it finds, so a web server can serve precompressed content instead of
//! compressing on the fly.
//!
//! # Features
//!
//! - `gzip` - Enable gzip artifacts (enabled by default)
//! - `brotli` - Enable brotli artifacts (enabled by default)
//! - `full` - Enable all compression algorithms
//!
//! # Example
//!
//! ```rust,no_run
//! use precompress_core::{Algorithm, PrecompressConfig, Precompressor};
//!
//! let config = PrecompressConfig::builder()
//!     .dir("dist")
//!     .algorithms([Algorithm::Gzip, Algorithm::Brotli])
//!     .min_size(1024)  // Leave files under 1KB alone
//!     .build();
//!
//! Precompressor::new(&config).run()?;
//! # Ok::<(), precompress_core::PrecompressError>(())
//! ```
//!
//! # Outputs
//!
//! For a source `R` relative to the input directory, the run produces
//! `<output>/R.gz` and `<output>/R.br`. An artifact that is not strictly
//! smaller than its source is deleted right after it is written.
//!
//! By default these suffixes are considered:
//!
//! - `.css`, `.js`, `.svg`, `.html`
//! - `.txt`, `.md`
//! - `.xml`, `.json`

mod algorithm;
mod config;
mod error;
mod filter;
mod precompressor;
pub mod streaming;

pub use algorithm::Algorithm;
pub use config::{
    DEFAULT_INCLUDE_SUFFIXES, DEFAULT_MIN_SIZE, DiscardPolicy, PrecompressConfig,
    PrecompressConfigBuilder, default_include_suffixes,
};
pub use error::PrecompressError;
pub use filter::InclusionFilter;
pub use precompressor::{FileOutcome, Precompressor};
pub use streaming::CompressionResult;

/// Result type for precompression operations
pub type Result<T> = std::result::Result<T, PrecompressError>;
