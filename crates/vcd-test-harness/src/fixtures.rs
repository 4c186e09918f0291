// crates/vcd-test-harness/src/fixtures.rs
// ============================================================================
// Module: Suite Fixtures
// Description: Provisions and removes the shared catalog and OVA item.
// Purpose: Give tests a catalog item to deploy from without per-test uploads.
// Dependencies: tracing, vcd-test-config
// ============================================================================

//! ## Overview
//! The suite shares one catalog and one catalog item across every test. Each
//! of them is in one of three situations:
//! - preconfigured in the configuration file: verified, never created or deleted;
//! - left over from an earlier run with `preserve` on: reused as is;
//! - absent: created (the item by uploading the suite OVA).
//!
//! Provisioning failures are fatal for the run. Teardown is best effort after
//! the connection is established: lookup and deletion failures are logged
//! and reported, not raised.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use tracing::info;
use tracing::warn;
use vcd_test_config::LoggingSettings;
use vcd_test_config::SuiteResourceNames;
use vcd_test_config::TestConfig;

use crate::download::download_file;
use crate::error::HarnessError;
use crate::platform::CatalogRef;
use crate::platform::ClientOptions;
use crate::platform::Credentials;
use crate::platform::OrgRef;
use crate::platform::PlatformClient;
use crate::platform::PlatformConnector;
use crate::platform::PlatformError;
use crate::platform::UploadProgress;
use crate::platform::UploadRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upload chunk size for the suite OVA.
pub const OVA_UPLOAD_CHUNK_SIZE: u64 = 20 * 1024 * 1024;
/// Description given to fixtures created by the suite.
const FIXTURE_DESCRIPTION: &str = "Test suite purpose";

// ============================================================================
// SECTION: Reports
// ============================================================================

/// How a fixture was made available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureOutcome {
    /// Created during this run.
    Created,
    /// Named in the configuration and found.
    Preconfigured,
    /// Left over from an earlier run and reused.
    Preserved,
}

/// Result of provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Catalog outcome.
    pub catalog: FixtureOutcome,
    /// Catalog item outcome.
    pub catalog_item: FixtureOutcome,
}

/// What happened to a fixture during teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Deleted during this run.
    Deleted,
    /// Kept because it is preconfigured.
    KeptPreconfigured,
    /// The catalog no longer exists.
    AlreadyRemoved,
    /// The item went away together with its catalog.
    RemovedWithCatalog,
    /// Teardown stopped before reaching this fixture.
    NotAttempted,
    /// Lookup or deletion failed; the message is the platform error.
    Failed(String),
}

/// Result of teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// Catalog outcome.
    pub catalog: TeardownOutcome,
    /// Catalog item outcome.
    pub catalog_item: TeardownOutcome,
}

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Makes the suite catalog and catalog item available.
///
/// `ova_path` is where the suite OVA is expected (and downloaded to when
/// missing).
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when the OVA source is not configured or
/// a preconfigured fixture is missing, [`HarnessError::Download`] when the OVA
/// cannot be fetched, and [`HarnessError::Platform`] for client failures.
pub fn provision_suite_fixtures<C: PlatformConnector>(
    connector: &C,
    config: &TestConfig,
    logging: &LoggingSettings,
    names: &SuiteResourceNames,
    ova_path: &Path,
) -> Result<ProvisionReport, HarnessError> {
    info!("Checking resources to create for test suite...");
    let preconfigured_catalog = !config.vcd.catalog.name.is_empty();
    let preconfigured_item = !config.vcd.catalog.catalog_item.is_empty();

    if !preconfigured_item {
        ensure_suite_ova(config, ova_path)?;
    }

    let mut client = connect(connector, config, logging)?;
    let org = client.org_by_name(&config.vcd.org)?;

    let (catalog, catalog_outcome) = if preconfigured_catalog {
        info!("Skipping catalog creation - found preconfigured one: {}", names.catalog);
        let catalog = client.catalog_by_name(&org, &names.catalog).map_err(|err| {
            HarnessError::Fixture(format!("Preconfigured catalog wasn't found: {err}"))
        })?;
        info!("Catalog found successfully");
        (catalog, FixtureOutcome::Preconfigured)
    } else {
        obtain_suite_catalog(&mut client, &org, &names.catalog)?
    };

    let item_outcome = if preconfigured_item {
        info!("Skipping catalog item creation - found preconfigured one: {}", names.catalog_item);
        client.catalog_item_by_name(&catalog, &names.catalog_item).map_err(|err| {
            HarnessError::Fixture(format!("Preconfigured catalog item wasn't found: {err}"))
        })?;
        info!("Catalog item found successfully");
        FixtureOutcome::Preconfigured
    } else {
        obtain_suite_item(&mut client, &catalog, &names.catalog_item, ova_path)?
    };

    Ok(ProvisionReport {
        catalog: catalog_outcome,
        catalog_item: item_outcome,
    })
}

/// Checks the OVA settings and downloads the file when it is missing.
fn ensure_suite_ova(config: &TestConfig, ova_path: &Path) -> Result<(), HarnessError> {
    if config.ova.ova_test_file_name.is_empty() {
        return Err(HarnessError::Fixture(
            "ovaTestFileName isn't configured. Tests terminated".to_string(),
        ));
    }
    if config.ova.ova_download_url.is_empty() {
        return Err(HarnessError::Fixture(
            "ovaDownloadUrl isn't configured. Tests terminated".to_string(),
        ));
    }
    info!("Downloading OVA. File will be saved as: {}", ova_path.display());
    if ova_path.exists() {
        info!("File already exists. Skipping downloading");
        return Ok(());
    }
    let bytes = download_file(ova_path, &config.ova.ova_download_url)?;
    info!(bytes, "OVA downloaded");
    Ok(())
}

/// Reuses the suite catalog when preserved, otherwise creates it.
fn obtain_suite_catalog<P: PlatformClient>(
    client: &mut P,
    org: &OrgRef,
    name: &str,
) -> Result<(CatalogRef, FixtureOutcome), HarnessError> {
    match client.catalog_by_name(org, name) {
        Ok(catalog) => {
            info!("Skipping catalog creation - catalog was preserved from previous creation");
            Ok((catalog, FixtureOutcome::Preserved))
        }
        Err(err) if err.is_not_found() => {
            info!("Creating catalog for test suite...");
            let catalog = client.create_catalog(org, name, FIXTURE_DESCRIPTION)?;
            info!("Catalog created successfully");
            Ok((catalog, FixtureOutcome::Created))
        }
        Err(err) => Err(err.into()),
    }
}

/// Reuses the suite item when preserved, otherwise uploads the OVA.
fn obtain_suite_item<P: PlatformClient>(
    client: &mut P,
    catalog: &CatalogRef,
    name: &str,
    ova_path: &Path,
) -> Result<FixtureOutcome, HarnessError> {
    match client.catalog_item_by_name(catalog, name) {
        Ok(_) => {
            info!(
                "Skipping catalog item creation - catalog item was preserved from previous \
                 creation"
            );
            Ok(FixtureOutcome::Preserved)
        }
        Err(err) if err.is_not_found() => {
            info!("Creating catalog item for test suite...");
            let request = UploadRequest {
                ova_path,
                item_name: name,
                description: FIXTURE_DESCRIPTION,
                chunk_size: OVA_UPLOAD_CHUNK_SIZE,
            };
            let mut report = |progress: UploadProgress| {
                info!("Upload progress: {:.2}%", progress.percent);
            };
            client.upload_ova(catalog, &request, &mut report).map_err(|err| {
                HarnessError::Fixture(format!("error uploading new catalog item: {err}"))
            })?;
            info!("Catalog item created successfully");
            Ok(FixtureOutcome::Created)
        }
        Err(err) => Err(err.into()),
    }
}

// ============================================================================
// SECTION: Teardown
// ============================================================================

/// Deletes the suite fixtures that this suite owns.
///
/// # Errors
///
/// Returns [`HarnessError::Platform`] when the client cannot connect,
/// authenticate, or find the org. Later failures are logged and reported in
/// the [`TeardownReport`].
pub fn teardown_suite_fixtures<C: PlatformConnector>(
    connector: &C,
    config: &TestConfig,
    logging: &LoggingSettings,
    names: &SuiteResourceNames,
) -> Result<TeardownReport, HarnessError> {
    info!("Looking for resources to delete from test suite...");
    let mut client = connect(connector, config, logging)?;
    let org = client.org_by_name(&config.vcd.org)?;

    let catalog = match client.catalog_by_name(&org, &names.catalog) {
        Ok(catalog) => catalog,
        Err(err) => {
            warn!("catalog already removed: {err}");
            return Ok(TeardownReport {
                catalog: TeardownOutcome::AlreadyRemoved,
                catalog_item: TeardownOutcome::AlreadyRemoved,
            });
        }
    };

    let catalog_deleted = if config.vcd.catalog.name.is_empty() {
        info!("Deleting catalog for test suite...");
        if let Err(err) = client.delete_catalog(&catalog, true, true) {
            warn!("error removing catalog: {err}");
            return Ok(TeardownReport {
                catalog: TeardownOutcome::Failed(err.to_string()),
                catalog_item: TeardownOutcome::NotAttempted,
            });
        }
        info!("Catalog {} removed successfully", catalog.name);
        true
    } else {
        info!("Catalog deletion skipped as user defined resource used");
        false
    };
    let catalog_outcome = if catalog_deleted {
        TeardownOutcome::Deleted
    } else {
        TeardownOutcome::KeptPreconfigured
    };

    let item_preconfigured = !config.vcd.catalog.catalog_item.is_empty();
    if item_preconfigured || catalog_deleted {
        info!(
            "Catalog item deletion skipped as user defined resource is used or removed with \
             catalog"
        );
        let item_outcome = if catalog_deleted {
            TeardownOutcome::RemovedWithCatalog
        } else {
            TeardownOutcome::KeptPreconfigured
        };
        return Ok(TeardownReport {
            catalog: catalog_outcome,
            catalog_item: item_outcome,
        });
    }

    let item_outcome = match delete_suite_item(&mut client, &catalog, &names.catalog_item) {
        Ok(()) => TeardownOutcome::Deleted,
        Err(err) => TeardownOutcome::Failed(err.to_string()),
    };
    Ok(TeardownReport {
        catalog: catalog_outcome,
        catalog_item: item_outcome,
    })
}

/// Finds and deletes the suite item, logging failures.
fn delete_suite_item<P: PlatformClient>(
    client: &mut P,
    catalog: &CatalogRef,
    name: &str,
) -> Result<(), PlatformError> {
    let item = client.catalog_item_by_name(catalog, name).inspect_err(|err| {
        warn!("error finding catalog item: {err}");
    })?;
    client.delete_catalog_item(&item).inspect_err(|err| {
        warn!("error removing catalog item: {err}");
    })?;
    info!("Catalog {} item removed successfully", item.name);
    Ok(())
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Builds and authenticates a client from the configuration.
fn connect<C: PlatformConnector>(
    connector: &C,
    config: &TestConfig,
    logging: &LoggingSettings,
) -> Result<C::Client, HarnessError> {
    let options = ClientOptions::from_config(config, logging)?;
    let mut client = connector.connect(&options)?;
    client.authenticate(&Credentials::from_config(config))?;
    Ok(client)
}
