//! JSON output for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "hash": "3a7bd3e2...", "files": ["/data/a.txt", "/data/sub/c.txt"] }
//!   ],
//!   "planned_links": [],
//!   "summary": {
//!     "files_found": 3,
//!     "files_hashed": 3,
//!     "unique_digests": 2,
//!     "directories": 1,
//!     "duplicate_groups": 1,
//!     "redundant_files": 1,
//!     "replaced": 0,
//!     "at_risk": [],
//!     "hash_failures": 0,
//!     "skipped_directories": 0,
//!     "scan_duration_ms": 12,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "LD000"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::RunSummary;
use crate::duplicates::DigestGroups;
use crate::error::ExitCode;

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Lowercase hex digest
    pub hash: String,
    /// Member paths in discovery order
    pub files: Vec<String>,
}

/// A candidate removed whose link could not be created.
#[derive(Debug, Clone, Serialize)]
pub struct JsonAtRisk {
    pub path: String,
    pub error: String,
}

/// A link a dry run would create.
#[derive(Debug, Clone, Serialize)]
pub struct JsonLink {
    pub original: String,
    pub candidate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub files_found: u64,
    pub files_hashed: u64,
    pub unique_digests: usize,
    pub directories: usize,
    pub duplicate_groups: usize,
    pub redundant_files: usize,
    pub replaced: usize,
    pub at_risk: Vec<JsonAtRisk>,
    pub hash_failures: usize,
    pub skipped_directories: usize,
    pub scan_duration_ms: u64,
    pub interrupted: bool,
    pub exit_code: i32,
    /// Machine-readable exit code name (e.g. "LD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    #[must_use]
    pub fn new(summary: &RunSummary, exit_code: ExitCode) -> Self {
        Self {
            files_found: summary.files_found,
            files_hashed: summary.files_hashed,
            unique_digests: summary.unique_digests,
            directories: summary.directories,
            duplicate_groups: summary.duplicate_groups,
            redundant_files: summary.redundant_files,
            replaced: summary.replaced,
            at_risk: summary
                .at_risk
                .iter()
                .map(|(path, error)| JsonAtRisk {
                    path: display_path(path),
                    error: error.clone(),
                })
                .collect(),
            hash_failures: summary.hash_failures,
            skipped_directories: summary.skipped_directories,
            scan_duration_ms: u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub duplicates: Vec<JsonDuplicateGroup>,
    pub planned_links: Vec<JsonLink>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    #[must_use]
    pub fn new(groups: &DigestGroups, summary: &RunSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(|(hash, paths)| JsonDuplicateGroup {
                    hash: hash.to_string(),
                    files: paths.iter().map(|p| display_path(p)).collect(),
                })
                .collect(),
            planned_links: summary
                .planned_links
                .iter()
                .map(|(original, candidate)| JsonLink {
                    original: display_path(original),
                    candidate: display_path(candidate),
                })
                .collect(),
            summary: JsonSummary::new(summary, exit_code),
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
