// crates/vcd-test-harness/tests/common/mod.rs
// =============================================================================
// Module: Harness Test Helpers
// Description: In-memory platform and config builders for harness tests.
// Purpose: Exercise fixture and suite flows without a live VCD.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test helpers favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use vcd_test_config::TestConfig;
use vcd_test_harness::platform::CatalogItemRef;
use vcd_test_harness::platform::CatalogRef;
use vcd_test_harness::platform::ClientOptions;
use vcd_test_harness::platform::Credentials;
use vcd_test_harness::platform::OrgRef;
use vcd_test_harness::platform::PlatformClient;
use vcd_test_harness::platform::PlatformConnector;
use vcd_test_harness::platform::PlatformError;
use vcd_test_harness::platform::UploadProgress;
use vcd_test_harness::platform::UploadRequest;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Recorded platform state shared by every client of one fake.
#[derive(Debug, Default)]
pub struct PlatformState {
    /// Known organizations.
    pub orgs: BTreeSet<String>,
    /// Catalog name to item names.
    pub catalogs: BTreeMap<String, BTreeSet<String>>,
    /// Operation log, e.g. `create_catalog:TestSuiteCatalog`.
    pub calls: Vec<String>,
    /// Options passed to the last `connect`.
    pub last_options: Option<ClientOptions>,
    /// Credentials passed to the last `authenticate`.
    pub last_credentials: Option<Credentials>,
    /// Fail authentication.
    pub reject_login: bool,
    /// Fail catalog deletion.
    pub fail_catalog_delete: bool,
    /// Fail uploads.
    pub fail_upload: bool,
}

/// In-memory platform; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    /// Creates a platform with one organization.
    pub fn with_org(org: &str) -> Self {
        let platform = Self::default();
        platform.state().orgs.insert(org.to_string());
        platform
    }

    /// Adds a catalog with `items`.
    pub fn add_catalog(&self, name: &str, items: &[&str]) {
        self.state()
            .catalogs
            .insert(name.to_string(), items.iter().map(|item| (*item).to_string()).collect());
    }

    /// Locks the shared state.
    pub fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true when `catalog` exists and holds `item`.
    pub fn has_item(&self, catalog: &str, item: &str) -> bool {
        self.state().catalogs.get(catalog).is_some_and(|items| items.contains(item))
    }

    /// Returns true when `catalog` exists.
    pub fn has_catalog(&self, catalog: &str) -> bool {
        self.state().catalogs.contains_key(catalog)
    }

    /// Returns the operation log.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

impl PlatformConnector for FakePlatform {
    type Client = Self;

    fn connect(&self, options: &ClientOptions) -> Result<Self::Client, PlatformError> {
        let mut state = self.state();
        state.calls.push("connect".to_string());
        state.last_options = Some(options.clone());
        Ok(self.clone())
    }
}

impl PlatformClient for FakePlatform {
    fn authenticate(&mut self, credentials: &Credentials) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("authenticate:{}@{}", credentials.user, credentials.org));
        state.last_credentials = Some(credentials.clone());
        if state.reject_login {
            return Err(PlatformError::Authentication("bad credentials".to_string()));
        }
        Ok(())
    }

    fn org_by_name(&self, name: &str) -> Result<OrgRef, PlatformError> {
        if self.state().orgs.contains(name) {
            Ok(OrgRef {
                name: name.to_string(),
            })
        } else {
            Err(PlatformError::NotFound {
                kind: "org",
                name: name.to_string(),
            })
        }
    }

    fn catalog_by_name(&self, org: &OrgRef, name: &str) -> Result<CatalogRef, PlatformError> {
        if self.state().catalogs.contains_key(name) {
            Ok(CatalogRef {
                org: org.name.clone(),
                name: name.to_string(),
            })
        } else {
            Err(PlatformError::NotFound {
                kind: "catalog",
                name: name.to_string(),
            })
        }
    }

    fn create_catalog(
        &mut self,
        org: &OrgRef,
        name: &str,
        _description: &str,
    ) -> Result<CatalogRef, PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("create_catalog:{name}"));
        state.catalogs.insert(name.to_string(), BTreeSet::new());
        Ok(CatalogRef {
            org: org.name.clone(),
            name: name.to_string(),
        })
    }

    fn delete_catalog(
        &mut self,
        catalog: &CatalogRef,
        force: bool,
        recursive: bool,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("delete_catalog:{}:{force}:{recursive}", catalog.name));
        if state.fail_catalog_delete {
            return Err(PlatformError::Api("catalog busy".to_string()));
        }
        state.catalogs.remove(&catalog.name);
        Ok(())
    }

    fn catalog_item_by_name(
        &self,
        catalog: &CatalogRef,
        name: &str,
    ) -> Result<CatalogItemRef, PlatformError> {
        if self.has_item(&catalog.name, name) {
            Ok(CatalogItemRef {
                catalog: catalog.name.clone(),
                name: name.to_string(),
            })
        } else {
            Err(PlatformError::NotFound {
                kind: "catalog item",
                name: name.to_string(),
            })
        }
    }

    fn delete_catalog_item(&mut self, item: &CatalogItemRef) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("delete_item:{}", item.name));
        if let Some(items) = state.catalogs.get_mut(&item.catalog) {
            items.remove(&item.name);
        }
        Ok(())
    }

    fn upload_ova(
        &mut self,
        catalog: &CatalogRef,
        request: &UploadRequest<'_>,
        progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<CatalogItemRef, PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("upload:{}:{}", request.item_name, request.chunk_size));
        if state.fail_upload {
            return Err(PlatformError::Api("upload rejected".to_string()));
        }
        progress(UploadProgress {
            percent: 100.0,
        });
        state
            .catalogs
            .entry(catalog.name.clone())
            .or_default()
            .insert(request.item_name.to_string());
        Ok(CatalogItemRef {
            catalog: catalog.name.clone(),
            name: request.item_name.to_string(),
        })
    }
}

/// Returns a config pointing at the fake platform's org.
pub fn base_config() -> TestConfig {
    let mut config = TestConfig::default();
    config.provider.user = "admin".to_string();
    config.provider.password = "secret".to_string();
    config.provider.url = "https://vcd.example.com/api".to_string();
    config.provider.sys_org = "System".to_string();
    config.vcd.org = "datacloud".to_string();
    config.vcd.vdc = "vdc-datacloud".to_string();
    config.ova.ova_test_file_name = "test_vapp_template.ova".to_string();
    config.ova.ova_download_url = "http://127.0.0.1:9/never-fetched.ova".to_string();
    config
}
