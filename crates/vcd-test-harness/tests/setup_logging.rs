//! Setup logging tests for vcd-test-harness.
// crates/vcd-test-harness/tests/setup_logging.rs
// =============================================================================
// Module: Setup Logging Tests
// Description: Run suites with file logging and inspect the log file.
// Purpose: Ensure configuration preparation is logged and fatal errors are
//          reported on stderr only.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::process::ExitCode;

use vcd_test_config::DEFAULT_CONFIG_NAME;
use vcd_test_config::remove_process_var;
use vcd_test_harness::SuiteOptions;
use vcd_test_harness::SuiteOutcome;
use vcd_test_harness::SuiteRunner;

use crate::common::FakePlatform;
use crate::common::TestResult;
use crate::common::base_config;

// The global subscriber is installed once per process, so every scenario that
// inspects the log file lives in this single test.
#[test]
fn preparation_is_logged_and_fatal_errors_stay_off_the_log() -> TestResult {
    remove_process_var("RUST_LOG");
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log_file = dir.path().join("suite.log");
    let mut config = base_config();
    config.logging.enabled = true;
    config.logging.log_file_name = log_file.to_string_lossy().into_owned();
    config.env_variables.insert("VCD_SETUP_LOG_MARKER".to_string(), "on".to_string());
    fs::write(
        dir.path().join(DEFAULT_CONFIG_NAME),
        serde_json::to_string(&config).map_err(|err| err.to_string())?,
    )
    .map_err(|err| err.to_string())?;

    let runner = SuiteRunner::with_env(
        SuiteOptions::new(dir.path()),
        FakePlatform::default(),
        BTreeMap::<String, String>::new(),
    );

    let outcome = runner
        .try_run(["suite", "-vcd-debug", "-vcd-short"], |_| true)
        .map_err(|err| err.to_string())?;
    assert_eq!(outcome, SuiteOutcome::Completed { passed: true });

    let log = fs::read_to_string(&log_file).map_err(|err| err.to_string())?;
    assert!(log.contains("configuration loaded"), "log was: {log}");
    assert!(
        log.contains("# Setting environment variable 'VCD_SETUP_LOG_MARKER' from '' to 'on'"),
        "log was: {log}"
    );

    let exit = runner.run(["suite", "-vcd-short", "-vcd-test-org-user"], |_| true);
    assert_eq!(exit, ExitCode::FAILURE);
    let log = fs::read_to_string(&log_file).map_err(|err| err.to_string())?;
    assert!(!log.contains("org user credentials were not found"), "log was: {log}");

    remove_process_var("VCD_SETUP_LOG_MARKER");
    Ok(())
}
