// crates/vcd-test-config/src/lib.rs
// ============================================================================
// Module: VCD Test Config Library
// Description: Acceptance-test configuration model and environment preparation.
// Purpose: Single source of truth for vcd_test_config.json semantics.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `vcd-test-config` defines the configuration record consumed by the VCD
//! provider acceptance suite. The record is parsed once per suite run, then
//! finalized by [`prepare`] into a [`PreparedConfig`] that carries the
//! resolved credentials, the environment assignments the provider under test
//! reads, and the shared fixture names.
//!
//! Nothing in this crate writes process state implicitly: environment changes
//! are collected into an [`EnvPlan`] and applied by the caller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod prepare;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod prepare_tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::EnvAssignment;
pub use env::EnvPlan;
pub use env::EnvSource;
pub use env::PlannedEnv;
pub use env::ProcessEnv;
pub use env::VcdEnv;
pub use env::remove_process_var;
pub use env::set_process_var;
pub use prepare::DEFAULT_API_LOG_FILE;
pub use prepare::DEFAULT_MAX_RETRY_TIMEOUT_SECS;
pub use prepare::DEFAULT_SUITE_CATALOG;
pub use prepare::DEFAULT_SUITE_CATALOG_ITEM;
pub use prepare::LoggingSettings;
pub use prepare::PrepareOptions;
pub use prepare::PreparedConfig;
pub use prepare::SuiteResourceNames;
pub use prepare::prepare;
