//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use coursegrab_core::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use coursegrab_core::{
    ConfigError, DEFAULT_OUTPUT_DIR, DEFAULT_PATTERN, DEFAULT_RESTRICTIONS, HarvestConfig,
    HttpTimeouts,
};

/// Download PDF files from a webpage with customizable pattern matching and filtering.
///
/// Scans a single page for links matching a pattern, skips files whose names
/// match a restriction word, and saves the rest without overwriting anything.
#[derive(Parser, Debug)]
#[command(name = "coursegrab")]
#[command(author, version, about)]
pub struct Args {
    /// Page URL to scan for links
    pub url: String,

    /// Directory to save downloaded files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Regex pattern (case-insensitive) matched against each link's href
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Words/patterns to exclude from downloads (pass `-r` alone to disable)
    #[arg(short, long, num_args = 0.., default_values_t = DEFAULT_RESTRICTIONS.map(String::from))]
    pub restrict: Vec<String>,

    /// Use the built-in course preset (fixed pattern and restrictions)
    #[arg(long, conflicts_with_all = ["pattern", "restrict"])]
    pub course: bool,

    /// List matching links and what would happen to them, without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Read timeout in seconds: abort when no data arrives for this long (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output (also honors NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Builds the run configuration, compiling every pattern.
    pub fn harvest_config(&self) -> Result<HarvestConfig, ConfigError> {
        let config = if self.course {
            HarvestConfig::course(&self.url)?
        } else {
            HarvestConfig::custom(&self.url, &self.pattern, &self.restrict)?
        };
        Ok(config
            .with_output_dir(self.output_dir.clone())
            .with_timeouts(HttpTimeouts {
                connect_secs: self.connect_timeout,
                read_secs: self.timeout,
            }))
    }

    /// Default log level from -q/-v flags.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
