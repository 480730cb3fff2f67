//! Fan-in of the pipeline's producer streams.
//!
//! # Overview
//!
//! The [`Aggregator`] is the only writer of the result tables. It waits on
//! four things at once with a single `select!`:
//!
//! | Source          | Producer      | Ends when                         |
//! |-----------------|---------------|-----------------------------------|
//! | digest results  | worker pool   | the last worker exits             |
//! | directory paths | walker        | the walker returns                |
//! | walk report     | walker        | the report has been delivered     |
//! | cancellation    | token         | never ends, fires at most once    |
//!
//! Each producer stream is tracked as [`Source::Open`] or
//! [`Source::Exhausted`]. An exhausted stream is swapped for a never-ready
//! channel, so the loop neither spins on a closed channel nor blocks on a
//! single stream while another has data. The loop ends when all three
//! streams are exhausted or cancellation is observed.
//!
//! On cancellation the aggregator stops waiting, discards whatever is still
//! buffered without blocking, and returns the partial tables.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{never, select, Receiver};

use super::finder::{Outcome, ScanReport};
use super::groups::GroupBuilder;
use super::workers::DigestResult;
use super::Counters;
use crate::scanner::{Digest, HashError, ScanError, WalkOutcome, WalkReport};
use crate::signal::CancelToken;

/// State of one producer stream.
#[derive(Debug)]
enum Source<T> {
    /// Still delivering messages
    Open(Receiver<T>),
    /// Closed and fully drained
    Exhausted,
}

impl<T> Source<T> {
    fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// The live receiver, or `idle` once exhausted.
    fn receiver<'a>(&'a self, idle: &'a Receiver<T>) -> &'a Receiver<T> {
        match self {
            Self::Open(rx) => rx,
            Self::Exhausted => idle,
        }
    }

    fn exhaust(&mut self) {
        *self = Self::Exhausted;
    }

    /// Take everything already buffered without waiting.
    fn drain_pending(&self) -> Vec<T> {
        match self {
            Self::Open(rx) => rx.try_iter().collect(),
            Self::Exhausted => Vec::new(),
        }
    }
}

/// Single-consumer builder of the pipeline's result tables.
#[derive(Debug)]
pub struct Aggregator {
    counters: Arc<Counters>,
    hashes: HashMap<PathBuf, Digest>,
    groups: GroupBuilder,
    directories: Vec<PathBuf>,
    hash_errors: Vec<HashError>,
    walk: Option<WalkReport>,
}

impl Aggregator {
    /// Create an aggregator updating `counters`.
    #[must_use]
    pub fn new(counters: Arc<Counters>) -> Self {
        Self {
            counters,
            hashes: HashMap::new(),
            groups: GroupBuilder::new(),
            directories: Vec::new(),
            hash_errors: Vec::new(),
            walk: None,
        }
    }

    /// Drain every source until exhaustion or cancellation, then assemble
    /// the report.
    ///
    /// The receivers are dropped on return, so producers still trying to
    /// send observe a disconnected channel.
    #[must_use]
    pub fn drain(
        mut self,
        results: Receiver<DigestResult>,
        dirs: Receiver<PathBuf>,
        walk: Receiver<WalkReport>,
        cancel: &CancelToken,
        started: Instant,
    ) -> ScanReport {
        let mut results = Source::Open(results);
        let mut dirs = Source::Open(dirs);
        let mut walk = Source::Open(walk);

        let idle_results = never();
        let idle_dirs = never();
        let idle_walk = never();

        let mut cancelled = false;

        while results.is_open() || dirs.is_open() || walk.is_open() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            select! {
                recv(results.receiver(&idle_results)) -> msg => match msg {
                    Ok(result) => self.on_result(result),
                    Err(_) => results.exhaust(),
                },
                recv(dirs.receiver(&idle_dirs)) -> msg => match msg {
                    Ok(dir) => self.directories.push(dir),
                    Err(_) => dirs.exhaust(),
                },
                recv(walk.receiver(&idle_walk)) -> msg => match msg {
                    Ok(report) => self.on_walk(report),
                    Err(_) => walk.exhaust(),
                },
                recv(cancel.done()) -> _ => {
                    cancelled = true;
                    break;
                }
            }
        }

        if cancelled {
            log::info!("Operation cancelled, returning partial results");
            let dropped = results.drain_pending().len() + dirs.drain_pending().len();
            if dropped > 0 {
                log::debug!("Discarded {} in-flight events after cancellation", dropped);
            }
            if let Some(report) = walk.drain_pending().pop() {
                self.on_walk(report);
            }
        }

        self.finish(cancelled, started)
    }

    /// Handle one digest result.
    fn on_result(&mut self, result: DigestResult) {
        match result.digest {
            Ok(digest) => {
                self.counters.record_hashed();
                if self.groups.insert(digest.to_hex(), result.path.clone()) {
                    log::trace!("Duplicate content: {}", result.path.display());
                }
                self.hashes.insert(result.path, digest);
            }
            Err(e) => {
                log::warn!("Error hashing file {}: {}", result.path.display(), e);
                self.hash_errors.push(e);
            }
        }
    }

    fn on_walk(&mut self, report: WalkReport) {
        match &report.outcome {
            WalkOutcome::Completed => log::debug!("Walk completed"),
            WalkOutcome::Cancelled => log::debug!("Walk cancelled"),
            WalkOutcome::Failed(e) => log::error!("Walk failed: {}", e),
        }
        self.walk = Some(report);
    }

    fn finish(self, cancelled: bool, started: Instant) -> ScanReport {
        let (outcome, walk_warnings) = match self.walk {
            Some(report) => {
                let outcome = match report.outcome {
                    _ if cancelled => Outcome::Cancelled,
                    WalkOutcome::Completed => Outcome::Completed,
                    WalkOutcome::Cancelled => Outcome::Cancelled,
                    WalkOutcome::Failed(e) => Outcome::Failed(e),
                };
                (outcome, report.warnings)
            }
            None if cancelled => (Outcome::Cancelled, Vec::new()),
            None => (
                Outcome::Failed(ScanError::Io {
                    path: PathBuf::new(),
                    source: Arc::new(std::io::Error::other(
                        "walker terminated without reporting",
                    )),
                }),
                Vec::new(),
            ),
        };

        ScanReport {
            unique_digests: self.groups.unique_digests(),
            groups: self.groups.finish(),
            directories: self.directories,
            hashes: self.hashes,
            hash_errors: self.hash_errors,
            walk_warnings,
            outcome,
            duration: started.elapsed(),
        }
    }
}
