// crates/vcd-test-harness/src/state.rs
// ============================================================================
// Module: State Checks
// Description: Read-only state snapshots and checks over flattened attributes.
// Purpose: Assert on set-typed attributes whose element keys are hashes.
// Dependencies: thiserror, tracing, vcd-test-config
// ============================================================================

//! ## Overview
//! Terraform flattens set attributes as `prefix.setId.field`, where `setId`
//! is an opaque hash. [`find_values_in_set`] groups those keys by set
//! identifier so a test can assert that several fields belong to the same
//! element without knowing the hash.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;
use vcd_test_config::EnvSource;

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// One resource in a state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Primary identifier.
    pub id: String,
    /// Flattened attributes.
    pub attributes: BTreeMap<String, String>,
}

impl ResourceState {
    /// Creates a resource with `id` and no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute and returns the resource.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Root-module resources keyed by address, e.g. `vcd_vapp_access_control.Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Resources by address.
    resources: BTreeMap<String, ResourceState>,
}

impl StateSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Adds or replaces a resource.
    pub fn insert(&mut self, address: impl Into<String>, resource: ResourceState) {
        self.resources.insert(address.into(), resource);
    }

    /// Returns the resource at `address`.
    #[must_use]
    pub fn resource(&self, address: &str) -> Option<&ResourceState> {
        self.resources.get(address)
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// State check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateCheckError {
    /// The resource is not in the state.
    #[error("not found: {0}")]
    NotFound(String),
    /// No set element carries every wanted pair.
    #[error("resource {resource} - {found} matches found - wanted {wanted}")]
    NoMatch {
        /// Resource address.
        resource: String,
        /// Number of set elements with at least one matching pair.
        found: usize,
        /// Number of wanted pairs.
        wanted: usize,
    },
}

/// A deferred check run against a state snapshot.
pub type StateCheck = Box<dyn Fn(&StateSnapshot) -> Result<(), StateCheckError> + Send + Sync>;

/// Succeeds when one element of set `prefix` carries every `wanted` pair.
///
/// Only three-segment keys (`prefix.setId.field`) are considered.
///
/// # Errors
///
/// Returns [`StateCheckError::NotFound`] when the resource is absent and
/// [`StateCheckError::NoMatch`] when no single element matches, including
/// when `wanted` is empty.
pub fn find_values_in_set(
    state: &StateSnapshot,
    resource: &str,
    prefix: &str,
    wanted: &BTreeMap<String, String>,
) -> Result<(), StateCheckError> {
    let found = state
        .resource(resource)
        .ok_or_else(|| StateCheckError::NotFound(resource.to_string()))?;

    let mut matches: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, value) in &found.attributes {
        let mut segments = key.split('.');
        let (Some(set_prefix), Some(set_id), Some(field), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            continue;
        };
        if set_prefix != prefix {
            continue;
        }
        if wanted.get(field).is_some_and(|expected| expected == value) {
            *matches.entry(set_id).or_default() += 1;
        }
    }

    if !wanted.is_empty() && matches.values().any(|count| *count == wanted.len()) {
        return Ok(());
    }
    Err(StateCheckError::NoMatch {
        resource: resource.to_string(),
        found: matches.len(),
        wanted: wanted.len(),
    })
}

/// Returns a deferred [`find_values_in_set`] check.
#[must_use]
pub fn values_in_set_check(
    resource: impl Into<String>,
    prefix: impl Into<String>,
    wanted: BTreeMap<String, String>,
) -> StateCheck {
    let resource = resource.into();
    let prefix = prefix.into();
    Box::new(move |state| find_values_in_set(state, &resource, &prefix, &wanted))
}

/// Replaces `check` with a no-op when `var` equals `value` in `env`.
///
/// An unset variable compares as the empty string.
#[must_use]
pub fn skip_on_env_variable(
    env: &impl EnvSource,
    var: &str,
    value: &str,
    notes: &str,
    check: StateCheck,
) -> StateCheck {
    if env.var(var).unwrap_or_default() == value {
        info!("### Check skipped at user request - Variable {var} - reason: {notes}");
        return Box::new(|_| Ok(()));
    }
    check
}
