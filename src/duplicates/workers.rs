//! Hashing worker pool.
//!
//! # Overview
//!
//! [`WorkerPool`] spawns a fixed number of named threads that share one
//! receiver of file paths. Each worker digests a path synchronously and sends
//! a [`DigestResult`]. When the cancellation token fires, a worker stops
//! taking paths and drops any result it has not yet delivered, so it never
//! blocks on a consumer that has stopped reading.
//!
//! The result sender is owned by the workers alone: the result stream closes
//! exactly when the last worker exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{select, Receiver, Sender};

use super::FinderError;
use crate::scanner::{Digest, Digester, HashError};
use crate::signal::CancelToken;

/// Outcome of hashing one file.
#[derive(Debug, Clone)]
pub struct DigestResult {
    /// File that was hashed
    pub path: PathBuf,
    /// Its digest, or why it could not be computed
    pub digest: Result<Digest, HashError>,
}

/// Fixed-size pool of hashing threads.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads reading from `paths` and writing to `results`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidWorkerCount`] if `workers` is zero; no thread
    ///   is started.
    /// - [`FinderError::Spawn`] if a thread cannot be created. Workers already
    ///   started exit once the path stream closes.
    pub fn spawn<D>(
        workers: usize,
        digester: Arc<D>,
        paths: Receiver<PathBuf>,
        results: Sender<DigestResult>,
        cancel: &CancelToken,
    ) -> Result<Self, FinderError>
    where
        D: Digester + ?Sized + 'static,
    {
        if workers < 1 {
            return Err(FinderError::InvalidWorkerCount(workers));
        }

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let digester = Arc::clone(&digester);
            let paths = paths.clone();
            let results = results.clone();
            let cancel = cancel.clone();

            let handle = std::thread::Builder::new()
                .name(format!("linkdupe-hash-{id}"))
                .spawn(move || digest_loop(id, digester.as_ref(), &paths, &results, &cancel))
                .map_err(FinderError::Spawn)?;
            handles.push(handle);
        }

        log::debug!("Started {} hashing workers", handles.len());
        Ok(Self { handles })
    }

    /// Number of workers in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    ///
    /// Returns the number of workers that panicked.
    pub fn join(self) -> usize {
        let mut panicked = 0;
        for handle in self.handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            log::error!("{} hashing worker(s) panicked", panicked);
        }
        panicked
    }
}

/// Body of one worker thread.
fn digest_loop<D>(
    id: usize,
    digester: &D,
    paths: &Receiver<PathBuf>,
    results: &Sender<DigestResult>,
    cancel: &CancelToken,
) where
    D: Digester + ?Sized,
{
    let mut processed = 0usize;

    loop {
        let path = select! {
            recv(paths) -> msg => match msg {
                Ok(path) => path,
                Err(_) => break,
            },
            recv(cancel.done()) -> _ => break,
        };

        let digest = digester.digest(&path);
        if let Err(ref e) = digest {
            log::debug!("Worker {}: failed to hash {}: {}", id, path.display(), e);
        }

        // The aggregator stops reading once cancelled; never wait on it then.
        if cancel.is_cancelled() {
            log::trace!("Worker {}: dropping result for {}", id, path.display());
            break;
        }

        let result = DigestResult { path, digest };
        select! {
            send(results, result) -> res => {
                if res.is_err() {
                    break;
                }
            }
            recv(cancel.done()) -> _ => {
                log::trace!("Worker {}: cancelled while delivering a result", id);
                break;
            }
        }
        processed += 1;
    }

    log::trace!("Worker {}: exiting after {} files", id, processed);
}
