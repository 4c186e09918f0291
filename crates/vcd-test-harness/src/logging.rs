// crates/vcd-test-harness/src/logging.rs
// ============================================================================
// Module: Suite Logging
// Description: Installs the tracing subscriber for a suite run.
// Purpose: Route harness logs to stderr or to the configured log file.
// Dependencies: tracing, tracing-subscriber, vcd-test-config
// ============================================================================

//! ## Overview
//! `RUST_LOG` wins when set. Otherwise the level follows the suite flags:
//! `trace` with vcd-trace, `debug` with vcd-debug or vcd-verbose, `info`
//! otherwise. When file logging is enabled in the configuration, output is
//! appended to the configured file instead of stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::sync::OnceLock;

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use vcd_test_config::LoggingSettings;

use crate::error::HarnessError;
use crate::flags::SuiteFlags;

/// Set once the first initialization attempt has installed a subscriber.
static INSTALLED: OnceLock<()> = OnceLock::new();

/// Returns the default filter directive for `flags`.
#[must_use]
pub const fn default_level(flags: &SuiteFlags) -> &'static str {
    if flags.trace {
        "trace"
    } else if flags.debug || flags.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber; later calls are no-ops.
///
/// # Errors
///
/// Returns [`HarnessError::Logging`] when the log file cannot be opened.
pub fn init_logging(flags: &SuiteFlags, settings: &LoggingSettings) -> Result<(), HarnessError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(flags)));

    let (writer, ansi) = if settings.enabled {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.file_name)
            .map_err(|err| {
                HarnessError::Logging(format!("could not open {}: {err}", settings.file_name))
            })?;
        (BoxMakeWriter::new(Mutex::new(file)), false)
    } else {
        (BoxMakeWriter::new(std::io::stderr), true)
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
    let _ = INSTALLED.set(());
    if installed.is_err() {
        debug!("tracing subscriber already installed; keeping the existing one");
    }
    Ok(())
}
