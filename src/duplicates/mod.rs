//! Duplicate detection module.
//!
//! This module provides the concurrent hashing pipeline:
//! - [`workers`]: fixed-size pool of hashing threads (fan-out)
//! - [`aggregator`]: single consumer merging all producer streams (fan-in)
//! - [`groups`]: digest → paths tables built by the aggregator
//! - [`finder`]: entry point wiring walker, workers and aggregator together

pub mod aggregator;
pub mod finder;
pub mod groups;
pub mod workers;

use std::sync::atomic::{AtomicU64, Ordering};

pub use aggregator::Aggregator;
pub use finder::{default_workers, run, DuplicateFinder, FinderError, Outcome, ScanReport};
pub use groups::{DigestGroups, GroupBuilder};
pub use workers::{DigestResult, WorkerPool};

/// Progress counters shared between the walker, the aggregator and any
/// progress display.
///
/// `files_found` is bumped by the walker when it classifies a regular file,
/// `files_hashed` by the aggregator for each successful digest, so
/// `files_hashed <= files_found` always holds.
#[derive(Debug, Default)]
pub struct Counters {
    files_found: AtomicU64,
    files_hashed: AtomicU64,
}

impl Counters {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a regular file found by the walker.
    pub fn record_found(&self) {
        self.files_found.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a file whose digest was computed successfully.
    pub fn record_hashed(&self) {
        self.files_hashed.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of regular files found so far.
    #[must_use]
    pub fn files_found(&self) -> u64 {
        self.files_found.load(Ordering::SeqCst)
    }

    /// Number of files hashed so far.
    #[must_use]
    pub fn files_hashed(&self) -> u64 {
        self.files_hashed.load(Ordering::SeqCst)
    }
}
