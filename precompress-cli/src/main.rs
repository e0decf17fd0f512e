//! precompress - write gzip and brotli siblings for static build output.
//!
//! ```text
//! precompress                          # target/classes, gzip + brotli
//! precompress -i dist                  # compress dist/ in place
//! precompress -i dist -o public -a br  # brotli only, mirrored under public/
//! precompress -c precompress.toml      # read settings from a file
//! ```
//!
//! Settings resolve as flag > environment variable > config file > default.

use clap::Parser;
use colored::Colorize;
use precompress_core::{Algorithm, DiscardPolicy, Precompressor};
use std::path::PathBuf;

mod error;
mod logging;
mod settings;

use error::CliResult;
use logging::LogFormat;
use settings::Settings;

/// Precompress static assets for serving
#[derive(Parser)]
#[command(name = "precompress")]
#[command(version)]
#[command(about = "Write .gz and .br siblings for static build output")]
#[command(long_about = None)]
#[command(after_help = format!(
    "{}\n  {} precompress -i dist\n  {} precompress -i dist -o public -a gzip,br -m 1024\n  {} precompress -c precompress.toml --on-discard skip-file",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    /// TOML file with default settings
    #[arg(short, long, env = "PRECOMPRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Build output directory; input and output default to <BUILD_DIR>/classes
    #[arg(long, env = "PRECOMPRESS_BUILD_DIR")]
    build_dir: Option<PathBuf>,

    /// Directory to scan
    #[arg(short, long, env = "PRECOMPRESS_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Directory to write artifacts under, mirroring the input tree
    #[arg(short, long, env = "PRECOMPRESS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Comma separated file name suffixes to compress
    #[arg(
        short = 's',
        long,
        value_delimiter = ',',
        env = "PRECOMPRESS_INCLUDE_SUFFIXES"
    )]
    include_suffixes: Option<Vec<String>>,

    /// Comma separated algorithms, run in order (gzip, brotli)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        value_parser = parse_algorithm,
        env = "PRECOMPRESS_ALGORITHMS"
    )]
    algorithms: Option<Vec<Algorithm>>,

    /// Files smaller than this many bytes are never compressed
    #[arg(short, long, env = "PRECOMPRESS_MIN_SIZE")]
    min_size: Option<u64>,

    /// Gzip level (1-9)
    #[arg(long)]
    gzip_level: Option<u32>,

    /// Brotli quality (0-11)
    #[arg(long)]
    brotli_level: Option<u32>,

    /// What to do after an artifact is discarded: next-algorithm or skip-file
    #[arg(long, value_parser = parse_discard_policy)]
    on_discard: Option<DiscardPolicy>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment.
    fn overrides(&self) -> Settings {
        Settings {
            build_dir: self.build_dir.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            include_suffixes: self.include_suffixes.clone(),
            algorithms: self.algorithms.clone(),
            min_size: self.min_size,
            gzip_level: self.gzip_level,
            brotli_level: self.brotli_level,
            on_discard: self.on_discard,
        }
    }
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse()
        .map_err(|e: precompress_core::PrecompressError| e.to_string())
}

fn parse_discard_policy(s: &str) -> Result<DiscardPolicy, String> {
    s.parse()
        .map_err(|e: precompress_core::PrecompressError| e.to_string())
}

fn run(cli: Cli) -> CliResult<()> {
    logging::init(
        logging::level_for(cli.verbose, cli.quiet),
        cli.log_format,
        !cli.no_color,
    );

    let file_settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = file_settings.merge(cli.overrides()).into_config();
    tracing::debug!(?config, "Resolved configuration");

    Precompressor::new(&config).run()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
