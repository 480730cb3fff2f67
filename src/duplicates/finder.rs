//! Duplicate finder: the traversal-and-hashing pipeline.
//!
//! # Overview
//!
//! This module wires the pipeline together:
//! 1. **Walk**: one [`TreeWalker`] thread streams file and directory paths
//! 2. **Hash**: a [`WorkerPool`] of W threads digests every file (fan-out)
//! 3. **Aggregate**: the calling thread runs the [`Aggregator`] (fan-in)
//!
//! All stages share one [`CancelToken`]. Every thread is joined before
//! [`DuplicateFinder::find_duplicates`] returns, whatever the outcome.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::duplicates::{DuplicateFinder, Outcome};
//! use linkdupe::scanner::Algorithm;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_algorithm(Algorithm::Blake3).with_workers(4);
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for (digest, paths) in report.groups.iter() {
//!     println!("{digest}: {paths:?}");
//! }
//! if let Outcome::Cancelled = report.outcome {
//!     eprintln!("results are partial");
//! }
//! ```

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;

use super::aggregator::Aggregator;
use super::groups::DigestGroups;
use super::workers::WorkerPool;
use super::Counters;
use crate::scanner::{Algorithm, Digest, Digester, FileDigester, HashError, ScanError, TreeWalker};
use crate::signal::CancelToken;

/// Queue slots per worker on each pipeline channel.
const CHANNEL_SLOTS_PER_WORKER: usize = 4;

/// Configuration errors raised before any traversal starts.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No digest function was supplied.
    #[error("No digest function configured")]
    MissingDigester,

    /// The worker count was below one.
    #[error("Number of workers must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    /// A pipeline thread could not be started.
    #[error("Failed to start pipeline thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The run was cancelled before completing.
    ///
    /// Not returned by [`DuplicateFinder::find_duplicates`], which reports
    /// cancellation as [`Outcome::Cancelled`]; callers that treat
    /// cancellation as an error raise it.
    #[error("Operation interrupted")]
    Interrupted,
}

/// How a scan ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The whole tree was scanned.
    Completed,
    /// The cancellation token fired; results are partial.
    Cancelled,
    /// Traversal could not proceed; results are partial.
    Failed(ScanError),
}

impl Outcome {
    /// Whether the scan covered the whole tree.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the scan was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Everything the pipeline produced.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Confirmed duplicate groups (two or more paths each)
    pub groups: DigestGroups,
    /// Every non-root directory visited
    pub directories: Vec<PathBuf>,
    /// Digest of every successfully hashed file
    pub hashes: HashMap<PathBuf, Digest>,
    /// Number of distinct digests seen
    pub unique_digests: usize,
    /// Files that could not be hashed
    pub hash_errors: Vec<HashError>,
    /// Subtrees skipped because they could not be read
    pub walk_warnings: Vec<ScanError>,
    /// How the scan ended
    pub outcome: Outcome,
    /// Wall-clock time of the scan
    pub duration: Duration,
}

impl ScanReport {
    /// Whether some files or directories were skipped along the way.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.hash_errors.is_empty() || !self.walk_warnings.is_empty()
    }
}

/// Default worker count: one per available CPU.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(4, NonZeroUsize::get)
}

/// Builder and entry point of the pipeline.
#[derive(Debug)]
pub struct DuplicateFinder<D: ?Sized = FileDigester> {
    digester: Option<Arc<D>>,
    workers: usize,
    cancel: CancelToken,
    counters: Arc<Counters>,
}

impl DuplicateFinder<FileDigester> {
    /// Finder using one of the built-in algorithms.
    #[must_use]
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self::new().with_digester(Arc::new(algorithm.digester()))
    }

    /// Finder using BLAKE3 and the default worker count.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_algorithm(Algorithm::default())
    }
}

impl<D> Default for DuplicateFinder<D>
where
    D: Digester + ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DuplicateFinder<D>
where
    D: Digester + ?Sized + 'static,
{
    /// Finder with no digester yet; [`with_digester`](Self::with_digester)
    /// must be called before scanning.
    #[must_use]
    pub fn new() -> Self {
        Self {
            digester: None,
            workers: default_workers(),
            cancel: CancelToken::new(),
            counters: Arc::new(Counters::new()),
        }
    }

    /// Set the digest function.
    #[must_use]
    pub fn with_digester(mut self, digester: Arc<D>) -> Self {
        self.digester = Some(digester);
        self
    }

    /// Set the number of hashing workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Share a cancellation token with the pipeline.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Share progress counters with the pipeline.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = counters;
        self
    }

    /// The counters this finder updates.
    #[must_use]
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Scan `root` and group its files by content digest.
    ///
    /// Cancellation and traversal failures are not errors here: they are
    /// reported through [`ScanReport::outcome`] together with the partial
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] for configuration problems, before any
    /// traversal starts.
    pub fn find_duplicates(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let digester = self.digester.clone().ok_or(FinderError::MissingDigester)?;
        if self.workers < 1 {
            return Err(FinderError::InvalidWorkerCount(self.workers));
        }

        let started = Instant::now();
        log::info!(
            "Starting parallel file scan of {} with {} workers",
            root.display(),
            self.workers
        );

        let capacity = self.workers * CHANNEL_SLOTS_PER_WORKER;
        let (file_tx, file_rx) = bounded(capacity);
        let (dir_tx, dir_rx) = bounded(capacity);
        let (result_tx, result_rx) = bounded(capacity);

        let pool = WorkerPool::spawn(self.workers, digester, file_rx, result_tx, &self.cancel)?;

        let walker = TreeWalker::new(root, self.cancel.clone())
            .with_counters(Arc::clone(&self.counters));
        let (walk_rx, walker_handle) = match walker.spawn(file_tx, dir_tx) {
            Ok(spawned) => spawned,
            Err(e) => {
                // The file sender went down with the closure; workers drain out.
                pool.join();
                return Err(FinderError::Spawn(e));
            }
        };

        let report = Aggregator::new(Arc::clone(&self.counters)).drain(
            result_rx,
            dir_rx,
            walk_rx,
            &self.cancel,
            started,
        );

        if walker_handle.join().is_err() {
            log::error!("Walker thread panicked");
        }
        pool.join();

        log::info!(
            "Hash calculation complete: {} found, {} hashed, {} duplicate groups in {:?}",
            self.counters.files_found(),
            self.counters.files_hashed(),
            report.groups.len(),
            report.duration
        );
        Ok(report)
    }
}

/// Run the pipeline once.
///
/// Convenience wrapper over [`DuplicateFinder`].
///
/// # Errors
///
/// Returns [`FinderError::MissingDigester`] if `digester` is `None` and
/// [`FinderError::InvalidWorkerCount`] if `workers` is zero, before any
/// traversal starts.
pub fn run<D>(
    root: &Path,
    digester: Option<Arc<D>>,
    workers: usize,
    cancel: &CancelToken,
    counters: Arc<Counters>,
) -> Result<ScanReport, FinderError>
where
    D: Digester + ?Sized + 'static,
{
    let mut finder = DuplicateFinder::new()
        .with_workers(workers)
        .with_cancel_token(cancel.clone())
        .with_counters(counters);
    finder.digester = digester;
    finder.find_duplicates(root)
}
