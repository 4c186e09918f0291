// crates/vcd-test-harness/src/import_id.rs
// ============================================================================
// Module: Import Identifiers
// Description: Builds dot-separated import identifiers for resources.
// Purpose: Give import steps a uniform way to address nested objects.
// Dependencies: thiserror, vcd-test-config
// ============================================================================

//! ## Overview
//! An import identifier lists the parents of an object followed by the object
//! itself, joined with [`IMPORT_SEPARATOR`]. Every composer refuses to build an
//! identifier when any component is empty.

use thiserror::Error;
use vcd_test_config::TestConfig;

use crate::state::StateSnapshot;

/// Separator between identifier components.
pub const IMPORT_SEPARATOR: &str = ".";

/// Import identifier failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportIdError {
    /// A component of the identifier is empty.
    #[error("missing information to generate import path")]
    MissingInformation,
    /// The referenced resource is not in the state.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    /// The referenced resource has no primary ID.
    #[error("no ID is set for {0} resource")]
    MissingId(String),
}

/// Joins `parts` with the separator; fails when any part is empty.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a part is empty.
pub fn compose(parts: &[&str]) -> Result<String, ImportIdError> {
    if parts.is_empty() || parts.iter().any(|part| part.is_empty()) {
        return Err(ImportIdError::MissingInformation);
    }
    Ok(parts.join(IMPORT_SEPARATOR))
}

/// Identifier for objects at the top of the hierarchy, such as an org.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when `name` is empty.
pub fn top_hierarchy(name: &str) -> Result<String, ImportIdError> {
    compose(&[name])
}

/// Identifier for objects owned by the configured org.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn org_object(config: &TestConfig, name: &str) -> Result<String, ImportIdError> {
    compose(&[&config.vcd.org, name])
}

/// Identifier for objects owned by the configured VDC.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn org_vdc_object(config: &TestConfig, name: &str) -> Result<String, ImportIdError> {
    compose(&[&config.vcd.org, &config.vcd.vdc, name])
}

/// Identifier for objects inside the configured catalog.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn org_catalog_object(config: &TestConfig, name: &str) -> Result<String, ImportIdError> {
    compose(&[&config.vcd.org, &config.vcd.catalog.name, name])
}

/// Identifier for objects inside a vApp.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn vapp_object(config: &TestConfig, vapp: &str, name: &str) -> Result<String, ImportIdError> {
    compose(&[&config.vcd.org, &config.vcd.vdc, vapp, name])
}

/// Identifier for objects attached to an edge gateway.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn edge_gateway_object(
    config: &TestConfig,
    edge_gateway: &str,
    name: &str,
) -> Result<String, ImportIdError> {
    compose(&[&config.vcd.org, &config.vcd.vdc, edge_gateway, name])
}

/// Identifier for objects attached to a VM; every component is explicit.
///
/// # Errors
///
/// Returns [`ImportIdError::MissingInformation`] when a component is empty.
pub fn vm_object(
    org: &str,
    vdc: &str,
    vapp: &str,
    vm: &str,
    object: &str,
) -> Result<String, ImportIdError> {
    compose(&[org, vdc, vapp, vm, object])
}

/// Identifier built from the primary ID of `resource` in `state`.
///
/// # Errors
///
/// Returns [`ImportIdError::ResourceNotFound`] when the resource is absent,
/// [`ImportIdError::MissingId`] when it has no ID, and
/// [`ImportIdError::MissingInformation`] when the org or VDC is empty.
pub fn via_resource(
    config: &TestConfig,
    state: &StateSnapshot,
    resource: &str,
) -> Result<String, ImportIdError> {
    let found = state
        .resource(resource)
        .ok_or_else(|| ImportIdError::ResourceNotFound(resource.to_string()))?;
    if found.id.is_empty() {
        return Err(ImportIdError::MissingId(resource.to_string()));
    }
    compose(&[&config.vcd.org, &config.vcd.vdc, &found.id])
}
