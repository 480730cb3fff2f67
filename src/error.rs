//! Exit codes and machine-readable error output.

use serde::Serialize;

use crate::duplicates::{FinderError, Outcome, ScanReport};

/// Process exit codes.
///
/// - 0: scan completed and duplicates were found
/// - 1: unexpected failure
/// - 2: scan completed, no duplicates
/// - 3: scan completed but some files or directories were skipped
/// - 130: interrupted (Ctrl+C, SIGTERM or timeout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates were found.
    NoDuplicates = 2,
    /// Some files could not be hashed or some directories were skipped.
    PartialSuccess = 3,
    /// The run was cancelled.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "LD000",
            Self::GeneralError => "LD001",
            Self::NoDuplicates => "LD002",
            Self::PartialSuccess => "LD003",
            Self::Interrupted => "LD130",
        }
    }

    /// Exit code for a finished scan.
    ///
    /// Cancellation wins over partial results, which win over the
    /// duplicates/no-duplicates distinction.
    #[must_use]
    pub fn for_report(report: &ScanReport) -> Self {
        match report.outcome {
            Outcome::Cancelled => Self::Interrupted,
            Outcome::Failed(_) => Self::GeneralError,
            Outcome::Completed if report.is_partial() => Self::PartialSuccess,
            Outcome::Completed if report.groups.is_empty() => Self::NoDuplicates,
            Outcome::Completed => Self::Success,
        }
    }

    /// Exit code for an error that ended the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Error information printed as JSON with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Code prefix, e.g. "LD001"
    pub code: String,
    pub exit_code: i32,
    /// Error message including its causes
    pub message: String,
    pub interrupted: bool,
}

impl StructuredError {
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
