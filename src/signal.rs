//! Cancellation and signal handling.
//!
//! This module provides the single cancellation signal shared by the walker,
//! the hashing workers and the aggregator. A [`CancelToken`] combines an
//! atomic flag, for cheap polling, with a channel that disconnects when the
//! token is cancelled, so blocked `select!` calls wake up immediately.
//!
//! # Usage
//!
//! ```rust,no_run
//! use linkdupe::signal::install_handler;
//! use std::time::Duration;
//!
//! // Ctrl+C and SIGTERM cancel the returned token
//! let token = install_handler().expect("Failed to install signal handler");
//!
//! // Optional deadline, implemented with the same token
//! let _deadline = token.cancel_after(Duration::from_secs(60));
//!
//! // Pass a clone to the pipeline, check it anywhere
//! if token.is_cancelled() {
//!     println!("Cancelled, results are partial");
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};

/// Shared cancellation signal.
///
/// Cloning is cheap and every clone observes the same state. Cancellation is
/// one-way: once cancelled, a token stays cancelled.
///
/// # Thread Safety
///
/// `CancelToken` is `Send` and `Sync`.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    flag: AtomicBool,
    // Dropping the sender disconnects `done`, waking every receiver.
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                flag: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
                done: rx,
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        let sender = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
    }

    /// Channel that becomes ready (disconnected) once the token is cancelled.
    ///
    /// Nothing is ever sent on it; use it as a `recv` arm in `select!`.
    #[must_use]
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }

    /// Cancel this token once `timeout` elapses.
    ///
    /// Dropping the returned guard disarms the deadline.
    #[must_use]
    pub fn cancel_after(&self, timeout: Duration) -> Deadline {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let token = self.clone();
        let handle = std::thread::Builder::new()
            .name("linkdupe-deadline".to_string())
            .spawn(move || {
                select! {
                    recv(token.done()) -> _ => {}
                    recv(stop_rx) -> _ => {}
                    default(timeout) => {
                        log::info!("Timeout of {:?} reached, cancelling", timeout);
                        token.cancel();
                    }
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to start deadline thread: {}", e);
                None
            }
        };

        Deadline {
            stop: Some(stop_tx),
            handle,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a pending [`CancelToken::cancel_after`] deadline.
#[derive(Debug)]
pub struct Deadline {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Deadline {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static ACTIVE_TOKEN: OnceLock<Mutex<CancelToken>> = OnceLock::new();

/// Install a Ctrl+C / SIGTERM handler that cancels the returned token.
///
/// The OS hook is registered once per process; later calls swap in a fresh
/// token so tests can call `run_app()` repeatedly.
///
/// # Errors
///
/// Returns [`SignalError`] if the OS handler cannot be registered.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    let token = CancelToken::new();

    if let Some(active) = ACTIVE_TOKEN.get() {
        *active.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        return Ok(token);
    }

    let active = ACTIVE_TOKEN.get_or_init(|| Mutex::new(token.clone()));
    *active.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();

    match ctrlc::set_handler(|| {
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
        if let Some(active) = ACTIVE_TOKEN.get() {
            active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .cancel();
        }
    }) {
        Ok(()) => Ok(token),
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked token");
            Ok(token)
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
