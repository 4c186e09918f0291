// crates/vcd-test-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error type shared by suite setup, rendering, and fixtures.
// Purpose: Carry setup failures up to the suite runner.
// Dependencies: thiserror, vcd-test-config
// ============================================================================

//! ## Overview
//! A broken fixture or configuration invalidates the whole run, so setup code
//! returns [`HarnessError`] and the suite runner turns it into a failing exit
//! code instead of aborting mid-flight.

use thiserror::Error;
use vcd_test_config::ConfigError;

use crate::download::DownloadError;
use crate::platform::PlatformError;

/// Harness failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or prepared.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Command-line flags could not be parsed.
    #[error("invalid vcd flags: {0}")]
    Flags(String),
    /// A template could not be rendered.
    #[error("template error: {0}")]
    Template(String),
    /// A rendered artifact could not be written.
    #[error("{0}")]
    Artifact(String),
    /// A fixture file could not be downloaded.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
    /// The platform client reported a failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Suite fixtures are misconfigured or missing.
    #[error("{0}")]
    Fixture(String),
    /// Logging could not be initialized.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// The suite cannot start.
    #[error("{0}")]
    Setup(String),
}
