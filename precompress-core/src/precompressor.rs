//! Directory walk and per-file compression orchestration

use crate::filter::InclusionFilter;
use crate::streaming::{CompressionResult, compress_file};
use crate::{Algorithm, DiscardPolicy, PrecompressConfig, PrecompressError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// What happened to one (file, algorithm) pair.
#[derive(Debug)]
pub enum FileOutcome {
    /// Artifact is smaller than the source and stays on disk
    Retained(CompressionResult),
    /// Artifact did not shrink the source and was deleted
    Discarded(CompressionResult),
    /// Compression failed; a partial artifact may remain
    Failed(PrecompressError),
}

/// Walks the input tree and writes precompressed siblings under the output
/// tree.
#[derive(Debug, Clone, Copy)]
pub struct Precompressor<'a> {
    config: &'a PrecompressConfig,
}

impl<'a> Precompressor<'a> {
    pub fn new(config: &'a PrecompressConfig) -> Self {
        Self { config }
    }

    /// Validate the configuration and check every enabled encoder.
    ///
    /// Nothing on disk is touched when this fails.
    pub fn ensure_available(&self) -> Result<()> {
        self.config.validate()?;
        for algorithm in &self.config.algorithms {
            algorithm.ensure_available(self.config.level_for(*algorithm))?;
        }
        Ok(())
    }

    /// Precompress every qualifying file below the input directory.
    ///
    /// Only setup failures are returned. Per-file and per-directory errors
    /// are logged and skipped.
    pub fn run(&self) -> Result<()> {
        self.ensure_available()?;

        debug!(
            input = %self.config.input_dir.display(),
            output = %self.config.output_dir.display(),
            algorithms = ?self.config.algorithms,
            "Precompressing static files"
        );

        let filter = InclusionFilter::new(self.config);
        let walker = WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_dangling_symlink(&e) => {
                    debug!(error = %e, "Skipping dangling symlink");
                    continue;
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    error!(
                        path = %path,
                        error = %PrecompressError::from(e),
                        "Skipping unreadable entry"
                    );
                    continue;
                }
            };

            if filter.include(entry.path()) {
                self.process_file(entry.path());
            }
        }

        Ok(())
    }

    /// Run every configured algorithm over one source file, in order.
    ///
    /// The file is not checked against the inclusion filter.
    pub fn process_file(&self, source: &Path) -> Vec<(Algorithm, FileOutcome)> {
        let mut outcomes = Vec::with_capacity(self.config.algorithms.len());

        for &algorithm in &self.config.algorithms {
            let Some(destination) = self.destination_for(source, algorithm) else {
                warn!(source = %source.display(), "Source is outside the input directory");
                break;
            };

            let level = self.config.level_for(algorithm);
            match compress_file(algorithm, level, source, &destination) {
                Ok(result) if result.is_reduction() => {
                    info!(
                        source = %source.display(),
                        destination = %destination.display(),
                        algorithm = %algorithm,
                        percent = result.percent(),
                        "{}({}b) -> {}({}b)[{}%]",
                        display_name(source),
                        result.source_len,
                        display_name(&destination),
                        result.destination_len,
                        result.percent()
                    );
                    outcomes.push((algorithm, FileOutcome::Retained(result)));
                }
                Ok(result) => {
                    if let Err(e) = fs::remove_file(&destination) {
                        error!(
                            destination = %destination.display(),
                            error = %PrecompressError::io(&destination, e),
                            "Failed to remove discarded artifact"
                        );
                    }
                    debug!(
                        source = %source.display(),
                        algorithm = %algorithm,
                        percent = result.percent(),
                        "Discarded artifact that did not shrink the source"
                    );
                    outcomes.push((algorithm, FileOutcome::Discarded(result)));

                    if self.config.discard_policy == DiscardPolicy::SkipFile {
                        break;
                    }
                }
                Err(e) => {
                    error!(
                        source = %source.display(),
                        algorithm = %algorithm,
                        error = %e,
                        "Failed to precompress file"
                    );
                    outcomes.push((algorithm, FileOutcome::Failed(e)));
                }
            }
        }

        outcomes
    }

    /// `output_dir` + path of `source` relative to `input_dir` + suffix.
    pub fn destination_for(&self, source: &Path, algorithm: Algorithm) -> Option<PathBuf> {
        let relative = source.strip_prefix(&self.config.input_dir).ok()?;
        let mut destination = self.config.output_dir.join(relative).into_os_string();
        destination.push(algorithm.suffix());
        Some(PathBuf::from(destination))
    }
}

/// A link whose target is gone is not a regular file, so it is skipped like
/// any other non-qualifying entry.
fn is_dangling_symlink(e: &walkdir::Error) -> bool {
    let Some(path) = e.path() else {
        return false;
    };
    e.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        && fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
