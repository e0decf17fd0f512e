//! Decides which files are worth precompressing

use crate::PrecompressConfig;
use std::fs::{self, Metadata};
use std::path::Path;

/// Size and suffix based predicate over filesystem entries.
#[derive(Debug, Clone, Copy)]
pub struct InclusionFilter<'a> {
    config: &'a PrecompressConfig,
}

impl<'a> InclusionFilter<'a> {
    pub fn new(config: &'a PrecompressConfig) -> Self {
        Self { config }
    }

    /// Check a path, following symlinks. Entries whose metadata can't be
    /// read are treated as missing.
    pub fn include(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(metadata) => self.include_with_metadata(path, &metadata),
            Err(_) => false,
        }
    }

    /// Check a path against already fetched metadata.
    pub fn include_with_metadata(&self, path: &Path, metadata: &Metadata) -> bool {
        if !metadata.is_file() || !self.config.meets_min_size(metadata.len()) {
            return false;
        }

        path.file_name()
            .map(|name| self.config.matches_suffix(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}
