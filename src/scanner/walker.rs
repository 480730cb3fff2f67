//! Directory walker feeding the hashing pipeline.
//!
//! # Overview
//!
//! This module provides the [`TreeWalker`] struct, a single-threaded,
//! deterministic traversal of a directory tree built on [`walkdir`].
//! Entries are visited in lexical order within each directory so the event
//! stream is reproducible for a fixed tree.
//!
//! # Events
//!
//! - Every regular file is sent on the file channel (symlinks are neither
//!   followed nor reported)
//! - Every directory except the root is sent on the directory channel
//! - The walk ends with a [`WalkReport`] carrying the terminal [`WalkOutcome`]
//!
//! Unreadable subdirectories are skipped with a warning. Only a missing or
//! unreadable root is fatal.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::TreeWalker;
//! use linkdupe::signal::CancelToken;
//! use std::path::Path;
//!
//! let (file_tx, file_rx) = crossbeam_channel::unbounded();
//! let (dir_tx, _dir_rx) = crossbeam_channel::unbounded();
//!
//! let walker = TreeWalker::new(Path::new("."), CancelToken::new());
//! let report = walker.walk(&file_tx, &dir_tx);
//! drop(file_tx);
//!
//! for path in file_rx {
//!     println!("{}", path.display());
//! }
//! println!("{:?}", report.outcome);
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use walkdir::WalkDir;

use super::ScanError;
use crate::duplicates::Counters;
use crate::signal::CancelToken;

/// Terminal state of a walk.
#[derive(Debug, Clone)]
pub enum WalkOutcome {
    /// Every reachable entry was visited.
    Completed,
    /// The cancellation token fired before the walk finished.
    Cancelled,
    /// The walk could not proceed (root missing or unreadable).
    Failed(ScanError),
}

impl WalkOutcome {
    /// Whether the walk visited the whole tree.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Summary sent by the walker when it stops.
#[derive(Debug, Clone)]
pub struct WalkReport {
    /// How the walk ended
    pub outcome: WalkOutcome,
    /// Non-fatal access errors; the affected subtrees were skipped
    pub warnings: Vec<ScanError>,
    /// Regular files emitted
    pub files: u64,
    /// Directories emitted
    pub directories: u64,
}

impl WalkReport {
    fn new() -> Self {
        Self {
            outcome: WalkOutcome::Completed,
            warnings: Vec::new(),
            files: 0,
            directories: 0,
        }
    }
}

/// Why an emission did not go through.
enum Stop {
    Cancelled,
    Disconnected,
}

/// Sequential directory walker.
#[derive(Debug)]
pub struct TreeWalker {
    /// Root path to walk
    root: PathBuf,
    /// Cancellation shared with the rest of the pipeline
    cancel: CancelToken,
    /// Counters updated as files are found
    counters: Arc<Counters>,
}

impl TreeWalker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, cancel: CancelToken) -> Self {
        Self {
            root: root.to_path_buf(),
            cancel,
            counters: Arc::new(Counters::new()),
        }
    }

    /// Share the pipeline counters; `files_found` is incremented per file.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = counters;
        self
    }

    /// Run the walk on a dedicated thread.
    ///
    /// Both senders are dropped when the walk ends, closing their streams.
    /// The report is delivered on a one-slot channel, so the walker never
    /// blocks on it.
    ///
    /// # Errors
    ///
    /// Returns the error from spawning the thread.
    pub fn spawn(
        self,
        files: Sender<PathBuf>,
        dirs: Sender<PathBuf>,
    ) -> io::Result<(Receiver<WalkReport>, JoinHandle<()>)> {
        let (report_tx, report_rx) = bounded(1);
        let handle = std::thread::Builder::new()
            .name("linkdupe-walker".to_string())
            .spawn(move || {
                let report = self.walk(&files, &dirs);
                drop(files);
                drop(dirs);
                let _ = report_tx.send(report);
            })?;
        Ok((report_rx, handle))
    }

    /// Walk the tree on the current thread, sending events as they are found.
    pub fn walk(&self, files: &Sender<PathBuf>, dirs: &Sender<PathBuf>) -> WalkReport {
        let mut report = WalkReport::new();

        if self.cancel.is_cancelled() {
            report.outcome = WalkOutcome::Cancelled;
            return report;
        }

        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                report.outcome = WalkOutcome::Failed(ScanError::NotADirectory(self.root.clone()));
                return report;
            }
            Err(e) => {
                report.outcome = WalkOutcome::Failed(ScanError::from_io(self.root.clone(), e));
                return report;
            }
        }

        let walk = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walk {
            if self.cancel.is_cancelled() {
                log::debug!("Walker: Cancellation requested, stopping traversal");
                report.outcome = WalkOutcome::Cancelled;
                return report;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let depth = e.depth();
                    let error = self.scan_error(e);
                    if depth == 0 {
                        log::error!("Cannot read root {}: {}", self.root.display(), error);
                        report.outcome = WalkOutcome::Failed(error);
                        return report;
                    }
                    log::warn!("Skipping {}: {}", error.path().display(), error);
                    report.warnings.push(error);
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            let sent = if file_type.is_dir() {
                report.directories += 1;
                self.emit(dirs, entry.into_path())
            } else if file_type.is_file() {
                self.counters.record_found();
                report.files += 1;
                self.emit(files, entry.into_path())
            } else {
                log::trace!("Skipping non-regular entry: {}", entry.path().display());
                Ok(())
            };

            match sent {
                Ok(()) => {}
                Err(Stop::Cancelled) => {
                    log::debug!("Walker: Cancelled while sending, stopping traversal");
                    report.outcome = WalkOutcome::Cancelled;
                    return report;
                }
                Err(Stop::Disconnected) => {
                    log::warn!("Walker: Consumers disconnected, stopping traversal");
                    report.outcome = WalkOutcome::Failed(ScanError::Io {
                        path: self.root.clone(),
                        source: Arc::new(io::Error::other("pipeline consumers disconnected")),
                    });
                    return report;
                }
            }
        }

        log::debug!(
            "Walker: Finished {} ({} files, {} directories, {} warnings)",
            self.root.display(),
            report.files,
            report.directories,
            report.warnings.len()
        );
        report
    }

    /// Send `path`, giving up as soon as the token is cancelled.
    fn emit(&self, tx: &Sender<PathBuf>, path: PathBuf) -> Result<(), Stop> {
        if self.cancel.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        select! {
            send(tx, path) -> res => res.map_err(|_| Stop::Disconnected),
            recv(self.cancel.done()) -> _ => Err(Stop::Cancelled),
        }
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn scan_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();
        match error.into_io_error() {
            Some(io_error) => ScanError::from_io(path, io_error),
            None => ScanError::Io {
                path,
                source: Arc::new(io::Error::other(message)),
            },
        }
    }
}
