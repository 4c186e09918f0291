// crates/vcd-test-config/src/prepare.rs
// ============================================================================
// Module: Configuration Preparation
// Description: Finalizes a parsed config for a suite run.
// Purpose: Resolve credentials, defaults, env exports, and fixture names.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! [`prepare`] turns a parsed [`TestConfig`] into the values a suite run uses:
//! the finalized record, the environment the provider under test reads, the
//! client logging settings, and the names of the shared catalog fixtures.
//! Rules run in a fixed order and later rules observe earlier env writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::config::ConfigError;
use crate::config::TestConfig;
use crate::env::EnvPlan;
use crate::env::EnvSource;
use crate::env::VcdEnv;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Catalog created by the suite when none is preconfigured.
pub const DEFAULT_SUITE_CATALOG: &str = "TestSuiteCatalog";
/// Catalog item uploaded by the suite when none is preconfigured.
pub const DEFAULT_SUITE_CATALOG_ITEM: &str = "TestSuiteOVA";
/// Client library log file used when logging is enabled without a name.
pub const DEFAULT_API_LOG_FILE: &str = "go-vcloud-director.log";
/// Retry timeout exported when neither config nor env define one.
pub const DEFAULT_MAX_RETRY_TIMEOUT_SECS: u64 = 300;
/// Password placeholder used with token authentication.
const TOKEN_PASSWORD_PLACEHOLDER: &str = "TOKEN";
/// Env var named in the org-user error message.
const ORG_USER_SWITCH: &str = "VCD_TEST_ORG_USER";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Switches that change how the config is finalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Replace the provider credentials with the configured org user.
    pub org_user: bool,
}

/// Client library logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Logging to a file is enabled.
    pub enabled: bool,
    /// Log file path.
    pub file_name: String,
    /// Log HTTP requests.
    pub http_request: bool,
    /// Log HTTP responses.
    pub http_response: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            file_name: DEFAULT_API_LOG_FILE.to_string(),
            http_request: false,
            http_response: false,
        }
    }
}

impl LoggingSettings {
    /// Derives the settings from the logging section of `config`.
    ///
    /// Only the logging section is read, so the settings are available before
    /// [`prepare`] runs.
    #[must_use]
    pub fn from_config(config: &TestConfig) -> Self {
        let section = &config.logging;
        if !section.enabled {
            return Self::default();
        }
        let file_name = if section.log_file_name.is_empty() {
            DEFAULT_API_LOG_FILE.to_string()
        } else {
            section.log_file_name.clone()
        };
        Self {
            enabled: true,
            file_name,
            http_request: section.log_http_request,
            http_response: section.log_http_response,
        }
    }
}

/// Names of the catalog fixtures shared by the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteResourceNames {
    /// Catalog name.
    pub catalog: String,
    /// Catalog item name.
    pub catalog_item: String,
}

impl Default for SuiteResourceNames {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_SUITE_CATALOG.to_string(),
            catalog_item: DEFAULT_SUITE_CATALOG_ITEM.to_string(),
        }
    }
}

/// A configuration ready for a suite run.
#[derive(Debug, Clone)]
pub struct PreparedConfig {
    /// Finalized configuration record.
    pub config: TestConfig,
    /// Environment assignments to apply before tests run.
    pub env: EnvPlan,
    /// Client library logging settings.
    pub logging: LoggingSettings,
    /// Shared fixture names.
    pub names: SuiteResourceNames,
    /// Reuse authenticated connections.
    pub connection_cache: bool,
}

// ============================================================================
// SECTION: Preparation
// ============================================================================

/// Finalizes `config` for a suite run.
///
/// `env` is the environment as seen before the run; `base_dir` anchors the
/// relative fixture paths.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the org-user switch is on without
/// org-user credentials, or when a fixture path cannot be made absolute.
pub fn prepare(
    mut config: TestConfig,
    options: &PrepareOptions,
    env: &impl EnvSource,
    base_dir: &Path,
) -> Result<PreparedConfig, ConfigError> {
    let mut plan = EnvPlan::new();

    for (key, value) in &config.env_variables {
        let current = plan.overlay(env).var(key).unwrap_or_default();
        debug!("# Setting environment variable '{key}' from '{current}' to '{value}'");
        plan.set(key.clone(), value.clone());
    }

    if config.provider.terraform_acceptance_tests {
        plan.set(VcdEnv::TfAcc.as_str(), "1");
    }

    let retry_key = VcdEnv::MaxRetryTimeout.as_str();
    if config.provider.max_retry_timeout == 0 {
        let configured = plan.overlay(env).is_set(retry_key);
        if !configured {
            plan.set(retry_key, DEFAULT_MAX_RETRY_TIMEOUT_SECS.to_string());
        }
    } else {
        plan.set(retry_key, config.provider.max_retry_timeout.to_string());
    }

    if config.provider.sys_org.is_empty() {
        config.provider.sys_org.clone_from(&config.vcd.org);
    }

    if options.org_user {
        let user = &config.test_env_build.org_user;
        let password = &config.test_env_build.org_user_password;
        if user.is_empty() || password.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{ORG_USER_SWITCH} was enabled, but org user credentials were not found in the \
                 configuration file"
            )));
        }
        config.provider.user.clone_from(user);
        config.provider.password.clone_from(password);
        config.provider.sys_org.clone_from(&config.vcd.org);
        info!("{ORG_USER_SWITCH} was enabled. Using Org User credentials from configuration file");
    }

    if !config.provider.token.is_empty() && config.provider.password.is_empty() {
        config.provider.password = TOKEN_PASSWORD_PLACEHOLDER.to_string();
    }

    plan.set(VcdEnv::User.as_str(), config.provider.user.clone());
    plan.set(VcdEnv::Password.as_str(), config.provider.password.clone());
    // A token supplied through the environment beats the configured one.
    let env_token = plan.overlay(env).non_empty(VcdEnv::Token.as_str());
    match env_token {
        Some(token) => config.provider.token = token,
        None => plan.set(VcdEnv::Token.as_str(), config.provider.token.clone()),
    }

    if config.provider.use_saml_adfs {
        plan.set(VcdEnv::AuthType.as_str(), "saml_adfs");
        plan.set(VcdEnv::SamlAdfsRptId.as_str(), config.provider.custom_adfs_rpt_id.clone());
    }

    plan.set(VcdEnv::Url.as_str(), config.provider.url.clone());
    plan.set(VcdEnv::SysOrg.as_str(), config.provider.sys_org.clone());
    plan.set(VcdEnv::Org.as_str(), config.vcd.org.clone());
    plan.set(VcdEnv::Vdc.as_str(), config.vcd.vdc.clone());

    if config.provider.allow_insecure {
        plan.set(VcdEnv::AllowUnverifiedSsl.as_str(), "1");
    }

    let logging = LoggingSettings::from_config(&config);

    absolutize(&mut config.ova.ova_path, base_dir, "OVA path")?;
    absolutize(&mut config.media.media_path, base_dir, "Media path")?;
    absolutize(&mut config.ova.ova_vapp_multi_vms_path, base_dir, "multi OVA path")?;

    let mut names = SuiteResourceNames::default();
    if !config.vcd.catalog.name.is_empty() {
        names.catalog.clone_from(&config.vcd.catalog.name);
    }
    if !config.vcd.catalog.catalog_item.is_empty() {
        names.catalog_item.clone_from(&config.vcd.catalog.catalog_item);
    }

    let connection_cache = config.provider.use_vcd_connection_cache;
    Ok(PreparedConfig {
        config,
        env: plan,
        logging,
        names,
        connection_cache,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rewrites a non-empty path as an absolute path anchored at `base_dir`.
fn absolutize(path: &mut String, base_dir: &Path, label: &str) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Ok(());
    }
    let joined: PathBuf = base_dir.join(path.as_str());
    let absolute = std::path::absolute(&joined).map_err(|err| {
        ConfigError::Invalid(format!("error retrieving absolute path for {label} {path}: {err}"))
    })?;
    let Some(text) = absolute.to_str() else {
        return Err(ConfigError::Invalid(format!("{label} {path} is not valid UTF-8")));
    };
    *path = text.to_string();
    Ok(())
}
