//! linkdupe - concurrent duplicate file finder
//!
//! Walks a directory tree, hashes every regular file on a pool of worker
//! threads, groups files by content digest and optionally replaces
//! duplicates with hard links to a single original.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{Counters, DuplicateFinder, FinderError, Outcome, ScanReport};
use crate::error::ExitCode;
use crate::output::{JsonOutput, RunSummary, TextReport};
use crate::progress::ProgressReporter;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, a failed traversal, or
/// [`FinderError::Interrupted`] when the run was cancelled.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config =
        Config::load(cli.config.as_deref(), &cli.overrides()).context("Failed to load configuration")?;
    log::debug!(
        "Scanning {} with {} using {} workers",
        cli.path.display(),
        config.algorithm,
        config.workers
    );

    let cancel = signal::install_handler()?;
    let _deadline = config.timeout().map(|timeout| cancel.cancel_after(timeout));

    let finder = DuplicateFinder::with_algorithm(config.algorithm)
        .with_workers(config.workers)
        .with_cancel_token(cancel.clone());
    let counters = finder.counters();

    let show_progress = !cli.quiet && cli.output == OutputFormat::Text;
    let progress = ProgressReporter::start(Arc::clone(&counters), !show_progress);
    let report = finder.find_duplicates(&cli.path);
    if show_progress {
        progress.finish();
    } else {
        progress.clear();
    }
    let report = report?;

    if let Outcome::Failed(e) = &report.outcome {
        return Err(e.clone()).with_context(|| format!("Scan of {} failed", cli.path.display()));
    }

    let summary = apply_actions(&config, &report, &counters);
    let exit_code = ExitCode::for_report(&report);
    let mut stdout = std::io::stdout().lock();
    match cli.output {
        OutputFormat::Text => TextReport::new(&report.groups, &summary)
            .write_to(&mut stdout)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&report.groups, &summary, exit_code)
            .write_to(&mut stdout)
            .context("Failed to write JSON output")?,
    }
    stdout.flush().context("Failed to flush output")?;

    if report.outcome.is_cancelled() {
        return Err(FinderError::Interrupted.into());
    }
    Ok(exit_code)
}

/// Summarize a scan and run the configured hard-link action on its groups.
///
/// Cancelled scans are summarized only; their groups may be incomplete.
fn apply_actions(config: &Config, report: &ScanReport, counters: &Counters) -> RunSummary {
    let summary = RunSummary::from_report(report, counters);
    if !config.hardlink || report.outcome.is_cancelled() {
        return summary;
    }
    if config.dry_run {
        summary.with_planned_links(actions::planned_links(&report.groups))
    } else {
        summary.with_consolidation(&actions::consolidate(&report.groups))
    }
}
