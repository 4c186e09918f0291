// crates/vcd-test-harness/src/env_snapshot.rs
// ============================================================================
// Module: VCD Environment Snapshot
// Description: Save, clear, and restore the `VCD*` environment variables.
// Purpose: Let provider tests run with a clean VCD environment temporarily.
// Dependencies: vcd-test-config
// ============================================================================

//! ## Overview
//! Tests that check how the provider behaves without environment overrides
//! call [`VcdEnvSnapshot::save`], then [`VcdEnvSnapshot::unset`], and finally
//! [`VcdEnvSnapshot::restore`]. Callers must not run such tests concurrently
//! with tests that read the same variables.

use std::collections::BTreeMap;

use vcd_test_config::remove_process_var;
use vcd_test_config::set_process_var;

/// Prefix selecting the captured variables.
const VCD_PREFIX: &str = "VCD";

/// Captured `VCD*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcdEnvSnapshot {
    /// Variable name to value.
    vars: BTreeMap<String, String>,
}

impl VcdEnvSnapshot {
    /// Captures every UTF-8 environment variable whose name starts with `VCD`.
    #[must_use]
    pub fn save() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .filter(|(key, _)| key.starts_with(VCD_PREFIX))
            .collect();
        Self {
            vars,
        }
    }

    /// Returns the captured variables.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Removes every captured variable from the process environment.
    pub fn unset(&self) {
        for key in self.vars.keys() {
            remove_process_var(key);
        }
    }

    /// Writes every captured variable back into the process environment.
    pub fn restore(&self) {
        for (key, value) in &self.vars {
            set_process_var(key, value);
        }
    }
}
