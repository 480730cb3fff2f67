//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under the current directory
//! linkdupe
//!
//! # Use SHA-256 with 8 workers and replace duplicates with hard links
//! linkdupe ~/Downloads --algo sha256 --workers 8 --hardlink
//!
//! # Show what would be linked, as JSON
//! linkdupe ~/Downloads --hardlink --dry-run --output json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;
use crate::scanner::Algorithm;

/// Find duplicate files by content and optionally replace them with hard links.
#[derive(Debug, Parser)]
#[command(name = "linkdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Hash algorithm
    #[arg(long = "algo", value_enum, value_name = "ALGO")]
    pub algorithm: Option<Algorithm>,

    /// Number of hashing workers (default: number of CPUs)
    #[arg(short = 'w', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Replace duplicates with hard links to the first copy found
    #[arg(long)]
    pub hardlink: bool,

    /// Report what --hardlink would do without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Cancel the scan after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (default: platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Settings given on the command line, to be layered over the
    /// configuration file and environment.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            algorithm: self.algorithm,
            workers: self.workers,
            hardlink: self.hardlink.then_some(true),
            dry_run: self.dry_run.then_some(true),
            timeout_secs: self.timeout,
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table and summary
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
