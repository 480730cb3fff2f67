//! Hard-link consolidation of duplicate groups.
//!
//! # Overview
//!
//! For each group, the first path is kept as the original and every later
//! path is replaced by a hard link to it. Each candidate moves through:
//!
//! ```text
//! Unchecked ──same object──▶ AlreadyLinked
//!     │
//!     └─▶ NeedsLink ──remove──▶ Removed ──link──▶ Linked
//!                                   │
//!                                   └──link fails──▶ RemovedButLinkFailed
//! ```
//!
//! Failures are per-candidate: they are logged, the candidate is skipped and
//! processing continues. `RemovedButLinkFailed` means the candidate path no
//! longer exists while the original still does; such candidates are kept,
//! with their cause, in [`ConsolidationSummary::at_risk`].
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::actions::consolidate;
//! use linkdupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let summary = consolidate(&report.groups);
//! println!("{}", summary.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DigestGroups;
use crate::scanner::hardlink::is_same_object;

/// Error for a single consolidation candidate.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// Could not tell whether the candidate is already linked.
    #[error("cannot inspect {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Could not remove the candidate; it is left untouched.
    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The candidate was removed but the link could not be created.
    #[error("removed {candidate} but could not link it to {original}: {source}")]
    Link {
        original: PathBuf,
        candidate: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConsolidateError {
    /// The candidate path this error concerns.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Inspect { path, .. } | Self::Remove { path, .. } => path,
            Self::Link { candidate, .. } => candidate,
        }
    }

    /// Whether the candidate path was lost.
    #[must_use]
    pub fn is_data_loss(&self) -> bool {
        matches!(self, Self::Link { .. })
    }
}

/// Terminal state of a successfully processed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    /// Candidate and original were already the same file object.
    AlreadyLinked,
    /// Candidate was replaced by a hard link to the original.
    Linked,
}

/// Totals of one consolidation pass.
#[derive(Debug, Default)]
pub struct ConsolidationSummary {
    /// Candidates replaced by hard links
    pub replaced: usize,
    /// Candidates that already shared the original's file object
    pub already_linked: usize,
    /// Candidates left in place because a step failed
    pub failures: Vec<ConsolidateError>,
    /// Candidates removed whose link could not be created, always
    /// [`ConsolidateError::Link`]
    pub at_risk: Vec<ConsolidateError>,
}

impl ConsolidationSummary {
    /// Whether every candidate ended linked.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && self.at_risk.is_empty()
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Replaced {} file(s) with hard links, {} already linked",
            self.replaced, self.already_linked
        );
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} skipped", self.failures.len()));
        }
        if !self.at_risk.is_empty() {
            line.push_str(&format!(", {} lost", self.at_risk.len()));
        }
        line
    }

    fn record(&mut self, outcome: Result<CandidateState, ConsolidateError>) {
        match outcome {
            Ok(CandidateState::Linked) => self.replaced += 1,
            Ok(CandidateState::AlreadyLinked) => self.already_linked += 1,
            Err(e) if e.is_data_loss() => {
                log::error!("Potential data loss: {}", e);
                self.at_risk.push(e);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", e.path().display(), e);
                self.failures.push(e);
            }
        }
    }
}

/// Replace every non-first member of each group with a hard link to the
/// group's first member.
///
/// Never removes an original. Running it again on the same groups is a
/// no-op (`replaced == 0`) on platforms where file identity is available.
#[must_use]
pub fn consolidate(groups: &DigestGroups) -> ConsolidationSummary {
    let mut summary = ConsolidationSummary::default();

    for (digest, paths) in groups.iter() {
        let Some((original, candidates)) = paths.split_first() else {
            continue;
        };
        log::debug!(
            "Consolidating group {} onto {}",
            digest,
            original.display()
        );
        for candidate in candidates {
            summary.record(link_candidate(original, candidate));
        }
    }

    log::info!("{}", summary.summary());
    summary
}

/// Pairs of (original, candidate) that [`consolidate`] would link.
///
/// Touches nothing on disk. Candidates already sharing the original's file
/// object are left out; candidates that cannot be inspected are kept.
#[must_use]
pub fn planned_links(groups: &DigestGroups) -> Vec<(PathBuf, PathBuf)> {
    let mut plan = Vec::new();
    for (_, paths) in groups.iter() {
        let Some((original, candidates)) = paths.split_first() else {
            continue;
        };
        for candidate in candidates {
            if !matches!(is_same_object(original, candidate), Ok(true)) {
                plan.push((original.clone(), candidate.clone()));
            }
        }
    }
    plan
}

/// Drive one candidate to a terminal state.
///
/// # Errors
///
/// - [`ConsolidateError::Inspect`] or [`ConsolidateError::Remove`]: the
///   candidate is untouched.
/// - [`ConsolidateError::Link`]: the candidate was removed and not replaced.
pub fn link_candidate(original: &Path, candidate: &Path) -> Result<CandidateState, ConsolidateError> {
    let same = is_same_object(original, candidate).map_err(|source| ConsolidateError::Inspect {
        path: candidate.to_path_buf(),
        source,
    })?;
    if same {
        log::trace!("Already linked: {}", candidate.display());
        return Ok(CandidateState::AlreadyLinked);
    }

    fs::remove_file(candidate).map_err(|source| ConsolidateError::Remove {
        path: candidate.to_path_buf(),
        source,
    })?;

    fs::hard_link(original, candidate).map_err(|source| ConsolidateError::Link {
        original: original.to_path_buf(),
        candidate: candidate.to_path_buf(),
        source,
    })?;

    log::debug!(
        "Linked {} -> {}",
        candidate.display(),
        original.display()
    );
    Ok(CandidateState::Linked)
}
