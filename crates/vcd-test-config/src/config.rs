// crates/vcd-test-config/src/config.rs
// ============================================================================
// Module: VCD Test Configuration
// Description: Configuration record and file loading for the acceptance suite.
// Purpose: Provide strict, fail-closed parsing of vcd_test_config.json.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The configuration file describes the target VCD environment: credentials,
//! tenant names, networking parameters, logging options, and the fixture files
//! used by the suite. Every section is optional in the file and defaults to
//! empty values so partial configurations still parse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::env::EnvSource;
use crate::env::VcdEnv;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename looked up next to the test sources.
pub const DEFAULT_CONFIG_NAME: &str = "vcd_test_config.json";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Organization name that identifies a system administrator connection.
const SYSTEM_ORG: &str = "system";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Acceptance-test configuration record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestConfig {
    /// Connection and authentication settings.
    pub provider: ProviderSection,
    /// Tenant hierarchy names.
    pub vcd: VcdSection,
    /// Networking parameters.
    pub networking: NetworkingSection,
    /// NSX-T manager and tier-0 routers.
    pub nsxt: NsxtSection,
    /// Client library logging options.
    pub logging: LoggingSection,
    /// OVA fixture settings.
    pub ova: OvaSection,
    /// Media fixture settings.
    pub media: MediaSection,
    /// Data used to build a new environment.
    pub test_env_build: TestEnvBuildSection,
    /// Environment variables set (or cleared) before the suite runs.
    pub env_variables: BTreeMap<String, String>,
}

/// Connection and authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderSection {
    /// User name (also the ADFS user when SAML is enabled).
    pub user: String,
    /// User password.
    pub password: String,
    /// API token; takes priority over user/password.
    pub token: String,
    /// Authenticate through a SAML ADFS identity provider.
    pub use_saml_adfs: bool,
    /// Custom relaying party trust identifier for ADFS.
    pub custom_adfs_rpt_id: String,
    /// Optional SAML user for the dedicated SAML test run.
    pub saml_user: String,
    /// Optional SAML password for the dedicated SAML test run.
    pub saml_password: String,
    /// Optional relaying party trust identifier for the SAML test run.
    pub saml_custom_rpt_id: String,
    /// API endpoint, e.g. `https://vcd.example.com/api`.
    pub url: String,
    /// Organization used to log in; defaults to `vcd.org`.
    pub sys_org: String,
    /// Skip TLS verification.
    pub allow_insecure: bool,
    /// Enable Terraform acceptance tests (`TF_ACC`).
    #[serde(rename = "tfAcceptanceTests")]
    pub terraform_acceptance_tests: bool,
    /// Reuse authenticated connections across tests.
    pub use_vcd_connection_cache: bool,
    /// Retry timeout in seconds; zero selects the suite default.
    pub max_retry_timeout: u64,
}

/// Tenant hierarchy names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VcdSection {
    /// Organization name.
    pub org: String,
    /// Virtual datacenter name.
    pub vdc: String,
    /// NSX-V provider VDC.
    pub provider_vdc: ProviderVdcSection,
    /// NSX-T provider VDC.
    pub nsxt_provider_vdc: NsxtProviderVdcSection,
    /// Preconfigured catalog and items.
    pub catalog: CatalogSection,
}

/// NSX-V provider VDC settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderVdcSection {
    /// Provider VDC name.
    pub name: String,
    /// Network pool name.
    pub network_pool: String,
    /// Primary storage profile.
    pub storage_profile: String,
    /// Secondary storage profile.
    pub storage_profile2: String,
}

/// NSX-T provider VDC settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NsxtProviderVdcSection {
    /// Provider VDC name.
    pub name: String,
    /// Storage profile.
    pub storage_profile: String,
    /// Network pool name.
    pub network_pool: String,
}

/// Preconfigured catalog resources.
///
/// # Invariants
/// - Empty `name`/`catalog_item` means the suite creates and owns the fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogSection {
    /// Catalog name.
    pub name: String,
    /// Catalog item holding a single-VM vApp template.
    pub catalog_item: String,
    /// Catalog item holding a multi-VM vApp template.
    pub catalog_item_with_multi_vms: String,
    /// First VM name inside the multi-VM item.
    pub vm_name1_in_multi_vm_item: String,
    /// Second VM name inside the multi-VM item.
    #[serde(rename = "VmName2InMultiVmItem")]
    pub vm_name2_in_multi_vm_item: String,
}

/// Networking parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkingSection {
    /// External IP address.
    pub external_ip: String,
    /// Internal IP address.
    pub internal_ip: String,
    /// Edge gateway name.
    pub edge_gateway: String,
    /// IPsec VPN shared secret.
    pub shared_secret: String,
    /// vCenter name.
    pub vcenter: String,
    /// External network name.
    pub external_network: String,
    /// Port group backing the external network.
    pub external_network_port_group: String,
    /// Port group type backing the external network.
    pub external_network_port_group_type: String,
    /// Local VPN endpoint.
    pub local: LocalEndpoint,
    /// Peer VPN endpoint.
    pub peer: PeerEndpoint,
}

/// Local VPN endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalEndpoint {
    /// Local IP address.
    pub local_ip: String,
    /// Local subnet gateway.
    #[serde(rename = "localSubnetGw")]
    pub local_subnet_gateway: String,
}

/// Peer VPN endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeerEndpoint {
    /// Peer IP address.
    pub peer_ip: String,
    /// Peer subnet gateway.
    #[serde(rename = "peerSubnetGw")]
    pub peer_subnet_gateway: String,
}

/// NSX-T settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NsxtSection {
    /// NSX-T manager name.
    pub manager: String,
    /// Tier-0 router name.
    #[serde(rename = "tier0router")]
    pub tier0_router: String,
    /// VRF-backed tier-0 router name.
    #[serde(rename = "tier0routervrf")]
    pub tier0_router_vrf: String,
}

/// Client library logging options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingSection {
    /// Enable logging to a file.
    pub enabled: bool,
    /// Log file name; empty selects the library default.
    pub log_file_name: String,
    /// Log HTTP requests.
    pub log_http_request: bool,
    /// Log HTTP responses.
    pub log_http_response: bool,
}

/// OVA fixture settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OvaSection {
    /// Path to an OVA used by upload tests.
    pub ova_path: String,
    /// Upload chunk size in bytes.
    pub upload_piece_size: u64,
    /// Show upload progress.
    pub upload_progress: bool,
    /// File name of the suite OVA under the test resources directory.
    pub ova_test_file_name: String,
    /// URL the suite OVA is downloaded from when missing.
    pub ova_download_url: String,
    /// Keep suite fixtures after the run.
    pub preserve: bool,
    /// Path to an OVA with a multi-VM vApp.
    pub ova_vapp_multi_vms_path: String,
}

/// Media fixture settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaSection {
    /// Path to an ISO used by media tests.
    pub media_path: String,
    /// Upload chunk size in bytes.
    pub upload_piece_size: u64,
    /// Show upload progress.
    pub upload_progress: bool,
    /// Media item name.
    pub media_name: String,
}

/// Data used to create a new environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestEnvBuildSection {
    /// Gateway for the external network.
    pub gateway: String,
    /// Netmask for the external network.
    pub netmask: String,
    /// First IP of the external network pool.
    pub external_network_start_ip: String,
    /// Last IP of the external network pool.
    pub external_network_end_ip: String,
    /// Primary DNS server.
    pub dns1: String,
    /// Secondary DNS server.
    pub dns2: String,
    /// Port group, if different from `networking.externalNetworkPortGroup`.
    pub external_network_port_group: String,
    /// Port group type, if different from `networking.externalNetworkPortGroupType`.
    pub external_network_port_group_type: String,
    /// Routed network to create.
    pub routed_network: String,
    /// Isolated network to create.
    pub isolated_network: String,
    /// Direct network to create.
    pub direct_network: String,
    /// Media path, if different from `media.mediaPath`.
    pub media_path: String,
    /// Media name to create.
    pub media_name: String,
    /// OVA path, if different from `ova.ovaPath`.
    pub ova_path: String,
    /// Org user created within the organization.
    pub org_user: String,
    /// Password for the org user.
    pub org_user_password: String,
}

// ============================================================================
// SECTION: Derived Values
// ============================================================================

/// Authentication method selected by the provider settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// API token login.
    Token,
    /// SAML login through ADFS.
    SamlAdfs,
    /// Local or LDAP user/password login.
    Integrated,
}

impl AuthType {
    /// Returns the provider `auth_type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::SamlAdfs => "saml_adfs",
            Self::Integrated => "integrated",
        }
    }

    /// Returns the label used in the suite connection banner.
    #[must_use]
    pub const fn banner_label(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::SamlAdfs => "SAML password",
            Self::Integrated => "password",
        }
    }
}

impl TestConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the size
    /// limit, is not UTF-8, or is not valid JSON for this record.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| {
            ConfigError::Io(format!("could not read config file {}: {err}", path.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_json_str(content)
    }

    /// Parses configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid JSON for this record.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns true when connections are made as a system administrator.
    #[must_use]
    pub fn using_sys_admin(&self) -> bool {
        self.provider.sys_org.eq_ignore_ascii_case(SYSTEM_ORG)
    }

    /// Returns the authentication method; a token always wins.
    #[must_use]
    pub fn auth_type(&self) -> AuthType {
        if !self.provider.token.is_empty() {
            AuthType::Token
        } else if self.provider.use_saml_adfs {
            AuthType::SamlAdfs
        } else {
            AuthType::Integrated
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and preparation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// JSON parsing error.
    #[error("could not unmarshal json file: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the configuration file location.
///
/// `VCD_CONFIG` wins when set; otherwise [`DEFAULT_CONFIG_NAME`] inside
/// `base_dir` is used. Returns `None` when the resolved file does not exist.
#[must_use]
pub fn resolve_config_path(env: &impl EnvSource, base_dir: &Path) -> Option<PathBuf> {
    let path = env
        .non_empty(VcdEnv::Config.as_str())
        .map_or_else(|| base_dir.join(DEFAULT_CONFIG_NAME), PathBuf::from);
    path.is_file().then_some(path)
}
