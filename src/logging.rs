//! Logging setup.
//!
//! Uses the `log` facade with an `env_logger` backend. The level comes from,
//! in priority order:
//!
//! 1. the `RUST_LOG` environment variable
//! 2. `--quiet` (errors only) or `--verbose` (debug, trace with `-vv`)
//! 3. info
//!
//! Debug builds prefix each line with a timestamp, and with the module path
//! when verbose. Release builds print level and message only.
//!
//! ```rust,no_run
//! linkdupe::logging::init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Install the global logger.
///
/// Later calls leave the first logger in place.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os("RUST_LOG").is_some();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already installed, keeping it");
        return;
    }
    log::debug!(
        "Logging at {} (from {})",
        log::max_level(),
        if from_env { "RUST_LOG" } else { "flags" }
    );
}

/// Level selected by the CLI flags; `quiet` wins over `verbose`.
#[must_use]
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

#[cfg(debug_assertions)]
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        let timestamp = buf.timestamp_millis();
        if verbose > 0 {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} [{}] {}",
                record.level(),
                record.module_path().unwrap_or("?"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} {}",
                record.level(),
                record.args()
            )
        }
    });
}

#[cfg(not(debug_assertions))]
fn configure_format(builder: &mut Builder, _verbose: u8) {
    builder.format(|buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
    });
}
