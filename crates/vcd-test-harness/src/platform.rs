// crates/vcd-test-harness/src/platform.rs
// ============================================================================
// Module: Platform Seam
// Description: Client options and the traits the suite drives the VCD API with.
// Purpose: Keep the REST client out of the harness while fixing its contract.
// Dependencies: thiserror, url, vcd-test-config
// ============================================================================

//! ## Overview
//! The harness never talks HTTP to VCD itself. A [`PlatformConnector`] turns
//! [`ClientOptions`] into a [`PlatformClient`], and fixture code only uses the
//! handful of operations defined here. Options and credentials are derived
//! from the prepared configuration so every implementation sees the same
//! endpoint, TLS policy, and user agent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use thiserror::Error;
use url::Url;
use vcd_test_config::LoggingSettings;
use vcd_test_config::TestConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Product token at the start of the user agent.
const USER_AGENT_PRODUCT: &str = "terraform-provider-vcd";
/// Build version reported by the test suite.
const USER_AGENT_BUILD: &str = "test";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Platform client failures.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The configured endpoint is not an absolute URL.
    #[error("could not parse Url: {0}")]
    InvalidUrl(String),
    /// Login failed.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// A named entity does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Entity kind, e.g. `catalog`.
        kind: &'static str,
        /// Entity name.
        name: String,
    },
    /// Any other client-side or API failure.
    #[error("{0}")]
    Api(String),
}

impl PlatformError {
    /// Returns true when the error reports a missing entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// SECTION: Connection Settings
// ============================================================================

/// Settings used to build a platform client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// API endpoint.
    pub endpoint: Url,
    /// Accept unverified TLS certificates.
    pub insecure: bool,
    /// Authenticate through SAML ADFS.
    pub use_saml_adfs: bool,
    /// Custom relaying party trust identifier.
    pub custom_adfs_rpt_id: String,
    /// HTTP user agent.
    pub user_agent: String,
    /// Log HTTP requests.
    pub log_http_request: bool,
    /// Log HTTP responses.
    pub log_http_response: bool,
}

impl ClientOptions {
    /// Derives client options from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidUrl`] when `provider.url` is not an
    /// absolute URL.
    pub fn from_config(config: &TestConfig, logging: &LoggingSettings) -> Result<Self, PlatformError> {
        let endpoint =
            Url::parse(&config.provider.url).map_err(|err| PlatformError::InvalidUrl(err.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(PlatformError::InvalidUrl(format!(
                "{} is not an absolute endpoint",
                config.provider.url
            )));
        }
        Ok(Self {
            endpoint,
            insecure: true,
            use_saml_adfs: config.provider.use_saml_adfs,
            custom_adfs_rpt_id: config.provider.custom_adfs_rpt_id.clone(),
            user_agent: user_agent(),
            log_http_request: logging.enabled && logging.http_request,
            log_http_response: logging.enabled && logging.http_response,
        })
    }
}

/// Returns the user agent sent by test clients.
#[must_use]
pub fn user_agent() -> String {
    format!(
        "{USER_AGENT_PRODUCT}/{USER_AGENT_BUILD} ({}/{}; isProvider:true)",
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Login secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// API token.
    Token(String),
    /// User password.
    Password(String),
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// Login credentials scoped to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Token or password.
    pub secret: Secret,
    /// Organization used to log in.
    pub org: String,
}

impl Credentials {
    /// Builds credentials from the configuration; a token wins.
    #[must_use]
    pub fn from_config(config: &TestConfig) -> Self {
        let provider = &config.provider;
        let secret = if provider.token.is_empty() {
            Secret::Password(provider.password.clone())
        } else {
            Secret::Token(provider.token.clone())
        };
        Self {
            user: provider.user.clone(),
            secret,
            org: provider.sys_org.clone(),
        }
    }
}

// ============================================================================
// SECTION: Entity References
// ============================================================================

/// Handle to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRef {
    /// Organization name.
    pub name: String,
}

/// Handle to a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRef {
    /// Owning organization.
    pub org: String,
    /// Catalog name.
    pub name: String,
}

/// Handle to a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItemRef {
    /// Owning catalog.
    pub catalog: String,
    /// Item name.
    pub name: String,
}

/// Parameters of an OVA upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Local OVA file.
    pub ova_path: &'a Path,
    /// Name of the new catalog item.
    pub item_name: &'a str,
    /// Item description.
    pub description: &'a str,
    /// Upload chunk size in bytes.
    pub chunk_size: u64,
}

/// Upload progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    /// Completed percentage, from 0 to 100.
    pub percent: f64,
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Builds platform clients.
pub trait PlatformConnector {
    /// Client type produced by this connector.
    type Client: PlatformClient;

    /// Creates an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the client cannot be built.
    fn connect(&self, options: &ClientOptions) -> Result<Self::Client, PlatformError>;
}

/// Operations the suite needs from a VCD client.
///
/// Every method returns [`PlatformError`] on failure; lookups use
/// [`PlatformError::NotFound`] for missing entities.
pub trait PlatformClient {
    /// Logs in.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Authentication`] when login fails.
    fn authenticate(&mut self, credentials: &Credentials) -> Result<(), PlatformError>;

    /// Looks up an organization by name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the lookup fails.
    fn org_by_name(&self, name: &str) -> Result<OrgRef, PlatformError>;

    /// Looks up a catalog by name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the lookup fails.
    fn catalog_by_name(&self, org: &OrgRef, name: &str) -> Result<CatalogRef, PlatformError>;

    /// Creates a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when creation fails.
    fn create_catalog(
        &mut self,
        org: &OrgRef,
        name: &str,
        description: &str,
    ) -> Result<CatalogRef, PlatformError>;

    /// Deletes a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when deletion fails.
    fn delete_catalog(
        &mut self,
        catalog: &CatalogRef,
        force: bool,
        recursive: bool,
    ) -> Result<(), PlatformError>;

    /// Looks up a catalog item by name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the lookup fails.
    fn catalog_item_by_name(
        &self,
        catalog: &CatalogRef,
        name: &str,
    ) -> Result<CatalogItemRef, PlatformError>;

    /// Deletes a catalog item.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when deletion fails.
    fn delete_catalog_item(&mut self, item: &CatalogItemRef) -> Result<(), PlatformError>;

    /// Uploads an OVA and waits for the import task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the upload or the import task fails.
    fn upload_ova(
        &mut self,
        catalog: &CatalogRef,
        request: &UploadRequest<'_>,
        progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<CatalogItemRef, PlatformError>;
}
