// crates/vcd-test-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config loading tests.
// Purpose: Reduce duplication across integration tests for vcd-test-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::io::Write;

use tempfile::NamedTempFile;
use vcd_test_config::ConfigError;
use vcd_test_config::TestConfig;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Writes `contents` into a temporary file.
pub fn temp_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

/// Asserts that a load failed with a message containing `needle`.
pub fn assert_invalid(result: Result<TestConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}
