//! Compression algorithm implementations

use crate::{PrecompressError, Result};
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Supported precompression algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Gzip compression (widely supported)
    Gzip,

    /// Brotli compression (best ratio for text)
    Brotli,
}

impl Algorithm {
    /// All algorithms in default processing order
    pub const ALL: [Algorithm; 2] = [Algorithm::Gzip, Algorithm::Brotli];

    /// Suffix appended to the source file name for this algorithm's artifact
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Brotli => ".br",
        }
    }

    /// Check if this algorithm is available (feature enabled)
    pub fn is_available(&self) -> bool {
        match self {
            Self::Gzip => cfg!(feature = "gzip"),
            Self::Brotli => cfg!(feature = "brotli"),
        }
    }

    /// Get the minimum compression level for this algorithm
    pub fn min_level(&self) -> u32 {
        match self {
            Self::Gzip => 1,
            Self::Brotli => 0,
        }
    }

    /// Get the maximum compression level for this algorithm
    pub fn max_level(&self) -> u32 {
        match self {
            Self::Gzip => 9,
            Self::Brotli => 11,
        }
    }

    /// Get the default compression level for this algorithm
    pub fn default_level(&self) -> u32 {
        match self {
            Self::Gzip => 6,
            Self::Brotli => 11,
        }
    }

    /// Reject levels outside `min_level..=max_level`.
    pub fn validate_level(&self, level: u32) -> Result<()> {
        if (self.min_level()..=self.max_level()).contains(&level) {
            Ok(())
        } else {
            Err(PrecompressError::InvalidLevel(
                self.to_string(),
                level,
                self.min_level(),
                self.max_level(),
            ))
        }
    }

    /// Verify the encoder can actually run before any file is touched.
    ///
    /// Fails when the algorithm's cargo feature is disabled or a trial
    /// encode of a small buffer errors.
    pub fn ensure_available(&self, level: u32) -> Result<()> {
        if !self.is_available() {
            return Err(PrecompressError::UnsupportedAlgorithm(format!(
                "{} (crate built without the `{}` feature)",
                self, self
            )));
        }

        let mut sample: &[u8] = b"precompress availability check";
        self.compress_stream(&mut sample, Vec::new(), level)
            .map(|_| ())
            .map_err(|e| PrecompressError::UnsupportedAlgorithm(format!("{}: {}", self, e)))
    }

    /// Stream everything from `reader` through this algorithm's encoder into
    /// `writer`, finishing the stream. Returns the writer so the caller can
    /// flush or close it.
    pub fn compress_stream<R: Read, W: Write>(
        &self,
        reader: &mut R,
        writer: W,
        level: u32,
    ) -> io::Result<W> {
        match self {
            Self::Gzip => compress_gzip(reader, writer, level),
            Self::Brotli => compress_brotli(reader, writer, level),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gzip => write!(f, "gzip"),
            Self::Brotli => write!(f, "brotli"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = PrecompressError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gzip" | "gz" => Ok(Self::Gzip),
            "brotli" | "br" => Ok(Self::Brotli),
            other => Err(PrecompressError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

// ========== Gzip Implementation ==========

#[cfg(feature = "gzip")]
fn compress_gzip<R: Read, W: Write>(reader: &mut R, writer: W, level: u32) -> io::Result<W> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(writer, Compression::new(level));
    io::copy(reader, &mut encoder)?;
    encoder.finish()
}

#[cfg(not(feature = "gzip"))]
fn compress_gzip<R: Read, W: Write>(_reader: &mut R, _writer: W, _level: u32) -> io::Result<W> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "gzip support not compiled in",
    ))
}

// ========== Brotli Implementation ==========

#[cfg(feature = "brotli")]
fn compress_brotli<R: Read, W: Write>(reader: &mut R, mut writer: W, level: u32) -> io::Result<W> {
    let params = brotli::enc::BrotliEncoderParams {
        quality: level as i32,
        ..Default::default()
    };

    brotli::BrotliCompress(reader, &mut writer, &params)?;
    Ok(writer)
}

#[cfg(not(feature = "brotli"))]
fn compress_brotli<R: Read, W: Write>(_reader: &mut R, _writer: W, _level: u32) -> io::Result<W> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "brotli support not compiled in",
    ))
}
