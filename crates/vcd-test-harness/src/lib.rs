// crates/vcd-test-harness/src/lib.rs
// ============================================================================
// Module: VCD Test Harness Library
// Description: Shared setup, fixtures, and helpers for VCD acceptance tests.
// Purpose: Provide the suite entry point and the helpers test cases call.
// Dependencies: vcd-test-config, clap, regex, reqwest, tracing
// ============================================================================

//! ## Overview
//! This crate hosts the pieces every VCD provider acceptance test leans on:
//! - [`suite::SuiteRunner`] parses the `vcd-*` flags, loads and prepares the
//!   configuration, provisions the shared catalog fixtures, runs the tests, and
//!   tears the fixtures down again.
//! - [`template::TemplateRenderer`] fills Terraform snippets and stores each one
//!   as an artifact named after the calling test.
//! - [`import_id`] and [`state`] build import identifiers and state checks.
//!
//! The VCD REST client itself is not part of this crate: it is reached through
//! the [`platform::PlatformConnector`] and [`platform::PlatformClient`] traits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod download;
pub mod env_snapshot;
pub mod error;
pub mod fixtures;
pub mod flags;
pub mod import_id;
pub mod logging;
pub mod platform;
pub mod skip;
pub mod state;
pub mod suite;
pub mod template;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod state_tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::HarnessError;
pub use flags::SuiteFlag;
pub use flags::SuiteFlags;
pub use suite::SuiteContext;
pub use suite::SuiteOptions;
pub use suite::SuiteOutcome;
pub use suite::SuiteRunner;
pub use template::Caller;
pub use template::TemplateData;
pub use template::TemplateRenderer;
pub use template::template_vars;
