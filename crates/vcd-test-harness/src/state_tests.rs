// crates/vcd-test-harness/src/state_tests.rs
// ============================================================================
// Module: State Check Unit Tests
// Description: Unit coverage for set matching and skippable checks.
// Purpose: Ensure set elements are matched by identifier, not by key order.
// Dependencies: std
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeMap;

use super::state::ResourceState;
use super::state::StateCheckError;
use super::state::StateSnapshot;
use super::state::find_values_in_set;
use super::state::skip_on_env_variable;
use super::state::values_in_set_check;

const RESOURCE: &str = "vcd_vapp_access_control.Name";

fn access_control_state() -> StateSnapshot {
    let resource = ResourceState::new("urn:vapp:1")
        .with_attribute("shared.2503357709.access_level", "FullControl")
        .with_attribute("shared.3479897784.user_id", "urn:vcloud:user:ec571e04")
        .with_attribute("shared.2503357709.user_id", "urn:vcloud:user:465308a5")
        .with_attribute("shared.2503357709.subject_name", "ac-user1")
        .with_attribute("shared.3479897784.subject_name", "ac-user2")
        .with_attribute("shared.3479897784.access_level", "Change")
        .with_attribute("shared.#", "2");
    let mut state = StateSnapshot::new();
    state.insert(RESOURCE, resource);
    state
}

fn wanted(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

#[test]
fn pairs_in_one_element_match() {
    let state = access_control_state();
    let wanted = wanted(&[("subject_name", "ac-user1"), ("access_level", "FullControl")]);
    find_values_in_set(&state, RESOURCE, "shared", &wanted).unwrap();
}

#[test]
fn pairs_split_across_elements_do_not_match() {
    let state = access_control_state();
    let wanted = wanted(&[("subject_name", "ac-user1"), ("access_level", "Change")]);
    let err = find_values_in_set(&state, RESOURCE, "shared", &wanted).unwrap_err();
    assert_eq!(
        err,
        StateCheckError::NoMatch {
            resource: RESOURCE.to_string(),
            found: 2,
            wanted: 2,
        }
    );
    assert_eq!(err.to_string(), "resource vcd_vapp_access_control.Name - 2 matches found - wanted 2");
}

#[test]
fn other_prefixes_are_ignored() {
    let state = access_control_state();
    let wanted = wanted(&[("subject_name", "ac-user1")]);
    assert!(find_values_in_set(&state, RESOURCE, "owners", &wanted).is_err());
}

#[test]
fn missing_resource_is_not_found() {
    let state = access_control_state();
    let err = find_values_in_set(&state, "vcd_vapp.none", "shared", &wanted(&[])).unwrap_err();
    assert_eq!(err.to_string(), "not found: vcd_vapp.none");
}

#[test]
fn empty_wanted_set_never_matches() {
    let state = access_control_state();
    assert!(find_values_in_set(&state, RESOURCE, "shared", &wanted(&[])).is_err());
}

#[test]
fn deferred_check_evaluates_later() {
    let check = values_in_set_check(RESOURCE, "shared", wanted(&[("subject_name", "ac-user2")]));
    check(&access_control_state()).unwrap();
    assert!(check(&StateSnapshot::new()).is_err());
}

#[test]
fn check_is_skipped_when_variable_matches() {
    let failing = values_in_set_check(RESOURCE, "shared", wanted(&[("subject_name", "nobody")]));
    let mut env = BTreeMap::new();
    env.insert("VCD_SKIP_ACL_CHECK".to_string(), "1".to_string());
    let skipped = skip_on_env_variable(&env, "VCD_SKIP_ACL_CHECK", "1", "flaky ACL", failing);
    skipped(&access_control_state()).unwrap();

    let failing = values_in_set_check(RESOURCE, "shared", wanted(&[("subject_name", "nobody")]));
    let kept = skip_on_env_variable(&env, "VCD_SKIP_ACL_CHECK", "2", "flaky ACL", failing);
    assert!(kept(&access_control_state()).is_err());
}
