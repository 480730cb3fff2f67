//! Progress display using indicatif.
//!
//! [`ProgressReporter`] runs a background thread that polls the shared
//! [`Counters`] and renders "Found N files, Hashed M files" on a spinner
//! until [`finish`](ProgressReporter::finish) is called.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};

use crate::duplicates::Counters;

/// How often the counters are re-read.
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Live "found / hashed" spinner.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Start reporting. With `quiet` nothing is drawn.
    #[must_use]
    pub fn start(counters: Arc<Counters>, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(REFRESH_INTERVAL);
            bar
        };

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let ticker = bar.clone();
        let handle = std::thread::Builder::new()
            .name("linkdupe-progress".to_string())
            .spawn(move || refresh_loop(&ticker, &counters, &stop_rx));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::debug!("Progress display unavailable: {}", e);
                None
            }
        };

        Self {
            bar,
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Stop the refresh thread and print the final line.
    pub fn finish(mut self) {
        self.stop_thread();
        self.bar.finish_with_message("Done");
    }

    /// Stop the refresh thread and erase the spinner.
    pub fn clear(mut self) {
        self.stop_thread();
        self.bar.finish_and_clear();
    }

    fn stop_thread(&mut self) {
        // Dropping the sender disconnects the receiver and wakes the thread.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

/// Message shown for the given counters.
#[must_use]
pub fn status_line(counters: &Counters) -> String {
    format!(
        "Found {} files, Hashed {} files",
        counters.files_found(),
        counters.files_hashed()
    )
}

fn refresh_loop(bar: &ProgressBar, counters: &Counters, stop: &Receiver<()>) {
    loop {
        bar.set_message(status_line(counters));
        select! {
            recv(stop) -> _ => break,
            default(REFRESH_INTERVAL) => {}
        }
    }
    bar.set_message(status_line(counters));
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}
