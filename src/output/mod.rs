//! Output formatters for scan results.
//!
//! - [`text`]: duplicate table and summary for terminals
//! - [`json`]: machine-readable output for scripting
//!
//! Both render a duplicate table together with a [`RunSummary`].
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::duplicates::DuplicateFinder;
//! use linkdupe::output::{RunSummary, TextReport};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//! let summary = RunSummary::from_report(&report, &finder.counters());
//!
//! TextReport::new(&report.groups, &summary)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

use std::path::PathBuf;
use std::time::Duration;

use crate::actions::ConsolidationSummary;
use crate::duplicates::{Counters, ScanReport};

pub use json::JsonOutput;
pub use text::TextReport;

/// Totals shown after the duplicate table.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files_found: u64,
    pub files_hashed: u64,
    pub unique_digests: usize,
    /// Directories discovered, excluding the root
    pub directories: usize,
    pub duplicate_groups: usize,
    /// Copies beyond the first in each group
    pub redundant_files: usize,
    /// Files replaced with hard links
    pub replaced: usize,
    /// Files removed whose link could not be created, with the cause
    pub at_risk: Vec<(PathBuf, String)>,
    /// (original, candidate) pairs a dry run would link
    pub planned_links: Vec<(PathBuf, PathBuf)>,
    pub hash_failures: usize,
    /// Subtrees skipped because they could not be read
    pub skipped_directories: usize,
    pub interrupted: bool,
    pub duration: Duration,
}

impl RunSummary {
    /// Summarize a finished scan.
    #[must_use]
    pub fn from_report(report: &ScanReport, counters: &Counters) -> Self {
        Self {
            files_found: counters.files_found(),
            files_hashed: counters.files_hashed(),
            unique_digests: report.unique_digests,
            directories: report.directories.len(),
            duplicate_groups: report.groups.len(),
            redundant_files: report.groups.redundant_files(),
            hash_failures: report.hash_errors.len(),
            skipped_directories: report.walk_warnings.len(),
            interrupted: report.outcome.is_cancelled(),
            duration: report.duration,
            ..Self::default()
        }
    }

    /// Add the result of hard-link consolidation.
    #[must_use]
    pub fn with_consolidation(mut self, consolidation: &ConsolidationSummary) -> Self {
        self.replaced = consolidation.replaced;
        self.at_risk = consolidation
            .at_risk
            .iter()
            .map(|e| (e.path().to_path_buf(), e.to_string()))
            .collect();
        self
    }

    /// Add the links a dry run would create.
    #[must_use]
    pub fn with_planned_links(mut self, plan: Vec<(PathBuf, PathBuf)>) -> Self {
        self.planned_links = plan;
        self
    }
}
