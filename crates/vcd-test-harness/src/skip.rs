// crates/vcd-test-harness/src/skip.rs
// ============================================================================
// Module: Skip Rules
// Description: Reasons for skipping tests the environment cannot support.
// Purpose: Share one wording for the common skip conditions.
// Dependencies: vcd-test-config
// ============================================================================

//! ## Overview
//! Each rule returns `Some(reason)` when the test should be skipped. The test
//! runner decides how to report the skip.

use vcd_test_config::EnvSource;
use vcd_test_config::TestConfig;
use vcd_test_config::VcdEnv;

/// Message for acceptance tests run without `TF_ACC`.
pub const ACCEPTANCE_TESTS_SKIPPED: &str = "Acceptance tests skipped unless env 'TF_ACC' set";
/// Prefix of every NSX-T skip reason.
const NSXT_MISSING: &str = "Missing NSX-T config: ";

/// Returns the skip reason when acceptance tests are not enabled.
#[must_use]
pub fn acceptance_skip_reason(env: &impl EnvSource) -> Option<&'static str> {
    (!env.is_set(VcdEnv::TfAcc.as_str())).then_some(ACCEPTANCE_TESTS_SKIPPED)
}

/// Returns the skip reason for the first missing NSX-T setting.
#[must_use]
pub fn nsxt_skip_reason(config: &TestConfig) -> Option<String> {
    let required = [
        (&config.vcd.nsxt_provider_vdc.name, "No provider VDC specified"),
        (&config.vcd.nsxt_provider_vdc.network_pool, "No network pool specified"),
        (&config.vcd.nsxt_provider_vdc.storage_profile, "No storage profile specified"),
        (&config.nsxt.manager, "No NSX-T manager specified"),
        (&config.nsxt.tier0_router, "No NSX-T Tier-0 specified"),
        (&config.nsxt.tier0_router_vrf, "No VRF NSX-T Tier-0 specified"),
    ];
    required
        .into_iter()
        .find(|(value, _)| value.is_empty())
        .map(|(_, reason)| format!("{NSXT_MISSING}{reason}"))
}
