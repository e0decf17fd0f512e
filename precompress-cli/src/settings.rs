//! Layered run settings: config file, then environment and flags.

use precompress_core::{Algorithm, DiscardPolicy, PrecompressConfig};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

/// Build output directory used when none is configured
pub const DEFAULT_BUILD_DIR: &str = "target";

/// Partial settings from one source. Unset fields fall through to the next
/// layer and finally to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub build_dir: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub include_suffixes: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_algorithms")]
    pub algorithms: Option<Vec<Algorithm>>,
    pub min_size: Option<u64>,
    pub gzip_level: Option<u32>,
    pub brotli_level: Option<u32>,
    #[serde(deserialize_with = "deserialize_discard_policy")]
    pub on_discard: Option<DiscardPolicy>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| CliError::ConfigFile(path.to_path_buf(), e))?;
        Self::parse(&content)
    }

    /// Parse settings from TOML.
    pub fn parse(content: &str) -> CliResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            build_dir: overrides.build_dir.or(self.build_dir),
            input_dir: overrides.input_dir.or(self.input_dir),
            output_dir: overrides.output_dir.or(self.output_dir),
            include_suffixes: overrides.include_suffixes.or(self.include_suffixes),
            algorithms: overrides.algorithms.or(self.algorithms),
            min_size: overrides.min_size.or(self.min_size),
            gzip_level: overrides.gzip_level.or(self.gzip_level),
            brotli_level: overrides.brotli_level.or(self.brotli_level),
            on_discard: overrides.on_discard.or(self.on_discard),
        }
    }

    /// Resolve into a run configuration, filling the gaps with defaults.
    ///
    /// Input and output directories default to `<build dir>/classes`.
    pub fn into_config(self) -> PrecompressConfig {
        let build_dir = self
            .build_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        let classes = build_dir.join("classes");

        let mut builder = PrecompressConfig::builder()
            .input_dir(self.input_dir.unwrap_or_else(|| classes.clone()))
            .output_dir(self.output_dir.unwrap_or(classes));

        if let Some(suffixes) = self.include_suffixes {
            builder = builder.include_suffixes(suffixes);
        }
        if let Some(algorithms) = self.algorithms {
            builder = builder.algorithms(algorithms);
        }
        if let Some(min_size) = self.min_size {
            builder = builder.min_size(min_size);
        }
        if let Some(level) = self.gzip_level {
            builder = builder.gzip_level(level);
        }
        if let Some(level) = self.brotli_level {
            builder = builder.brotli_level(level);
        }
        if let Some(policy) = self.on_discard {
            builder = builder.discard_policy(policy);
        }

        builder.build()
    }
}

fn deserialize_algorithms<'de, D>(deserializer: D) -> Result<Option<Vec<Algorithm>>, D::Error>
where
    D: Deserializer<'de>,
{
    let names: Option<Vec<String>> = Option::deserialize(deserializer)?;
    names
        .map(|names| {
            names
                .iter()
                .map(|name| name.parse().map_err(serde::de::Error::custom))
                .collect()
        })
        .transpose()
}

fn deserialize_discard_policy<'de, D>(deserializer: D) -> Result<Option<DiscardPolicy>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    name.map(|name| name.parse().map_err(serde::de::Error::custom))
        .transpose()
}
