//! Command-line argument parsing for the image cache
//!
//! This module defines the CLI structure using clap derive macros: fetching
//! resources into the cache and the administration commands around it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::client::DownloadOptions;

/// Image cache - fetch remote resources into a local disk cache
#[derive(Parser, Debug)]
#[command(
    name = "image_cache",
    version,
    about = "Fetch remote images into a local disk cache",
    long_about = "Downloads resources once and serves them from a local directory afterwards.
Cached files are named after the MD5 of their URI, so the same URI always maps to the same file."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache directory path
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download resources into the cache (or find them there)
    Fetch(FetchArgs),

    /// Remove every cached file
    Clear,

    /// Show the total size of the cache directory
    Size,

    /// Remove the cached files of specific URIs
    Remove {
        /// URIs whose cached files should be deleted
        #[arg(required = true, value_name = "URI")]
        uris: Vec<String>,
    },

    /// Show cache statistics
    Info {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete temporary files left by interrupted downloads
    Clean,

    /// Show the cache key and file path of a URI
    Key {
        /// URI to derive the key for
        #[arg(value_name = "URI")]
        uri: String,
    },
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// URIs to fetch
    #[arg(required = true, value_name = "URI")]
    pub uris: Vec<String>,

    /// Extra request header, as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Compute and print the MD5 of downloaded files
    #[arg(long)]
    pub checksum: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// `default` applies when no verbosity flag was given.
    pub fn log_level(&self, default: tracing::Level) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            default
        }
    }
}

impl FetchArgs {
    /// Download options shared by every URI of this invocation
    pub fn download_options(&self) -> DownloadOptions {
        let options = if self.checksum {
            DownloadOptions::default().with_checksum(true)
        } else {
            DownloadOptions::default()
        };

        self.headers
            .iter()
            .fold(options, |options, (name, value)| {
                options.with_header(name.as_str(), value.as_str())
            })
    }
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", raw));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
