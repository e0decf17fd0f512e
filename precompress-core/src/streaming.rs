//! Streaming file compression
//!
//! Sources are never buffered whole: bytes flow from a buffered reader
//! through the algorithm's encoder straight into the destination file.
//! Both handles live only for the duration of [`compress_file`], so they are
//! closed on every exit path before the next file is touched.

use crate::{Algorithm, PrecompressError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::Path;

/// Sizes of one source/artifact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionResult {
    /// Bytes read from the source
    pub source_len: u64,
    /// Bytes on disk for the artifact
    pub destination_len: u64,
}

impl CompressionResult {
    pub fn new(source_len: u64, destination_len: u64) -> Self {
        Self {
            source_len,
            destination_len,
        }
    }

    /// Artifact size as a floored percentage of the source size.
    ///
    /// An empty source reports 100 so it is never kept.
    pub fn percent(&self) -> u64 {
        (self.destination_len.saturating_mul(100))
            .checked_div(self.source_len)
            .unwrap_or(100)
    }

    /// Whether the artifact is worth keeping
    pub fn is_reduction(&self) -> bool {
        self.percent() < 100
    }
}

/// Reader adapter that counts bytes and labels read errors with the source path.
struct CountingReader<'a, R> {
    inner: R,
    path: &'a Path,
    count: u64,
}

impl<'a, R: Read> CountingReader<'a, R> {
    fn new(inner: R, path: &'a Path) -> Self {
        Self {
            inner,
            path,
            count: 0,
        }
    }
}

impl<R: Read> Read for CountingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.count += n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(io::Error::new(
                e.kind(),
                format!("reading {}: {}", self.path.display(), e),
            )),
        }
    }
}

/// Compress `source` into `destination` with `algorithm`.
///
/// Missing parent directories of `destination` are created. On error a
/// partial destination may remain on disk.
pub fn compress_file(
    algorithm: Algorithm,
    level: u32,
    source: &Path,
    destination: &Path,
) -> Result<CompressionResult> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| PrecompressError::io(parent, e))?;
    }

    let input = File::open(source).map_err(|e| PrecompressError::io(source, e))?;
    let output = File::create(destination).map_err(|e| PrecompressError::io(destination, e))?;

    let mut reader = CountingReader::new(BufReader::new(input), source);
    let writer = algorithm
        .compress_stream(&mut reader, BufWriter::new(output), level)
        .map_err(|e| PrecompressError::io(destination, e))?;
    let output = writer
        .into_inner()
        .map_err(|e| PrecompressError::io(destination, e.into_error()))?;
    drop(output);

    let destination_len = fs::metadata(destination)
        .map_err(|e| PrecompressError::io(destination, e))?
        .len();

    Ok(CompressionResult::new(reader.count, destination_len))
}
