// crates/vcd-test-config/src/prepare_tests.rs
// ============================================================================
// Module: Preparation Unit Tests
// Description: Unit coverage for config finalization and env planning.
// Purpose: Pin the order and content of environment exports.
// Dependencies: std
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeMap;
use std::path::Path;

use super::config::TestConfig;
use super::prepare::DEFAULT_API_LOG_FILE;
use super::prepare::LoggingSettings;
use super::prepare::PrepareOptions;
use super::prepare::prepare;

fn base_config() -> TestConfig {
    let mut config = TestConfig::default();
    config.provider.user = "admin".to_string();
    config.provider.password = "secret".to_string();
    config.provider.url = "https://vcd.example.com/api".to_string();
    config.vcd.org = "datacloud".to_string();
    config.vcd.vdc = "vdc-datacloud".to_string();
    config
}

fn empty_env() -> BTreeMap<String, String> {
    BTreeMap::new()
}

#[test]
fn exports_connection_variables() {
    let prepared =
        prepare(base_config(), &PrepareOptions::default(), &empty_env(), Path::new("/suite"))
            .unwrap();
    let plan = &prepared.env;
    assert_eq!(plan.planned("VCD_USER"), Some("admin"));
    assert_eq!(plan.planned("VCD_PASSWORD"), Some("secret"));
    assert_eq!(plan.planned("VCD_URL"), Some("https://vcd.example.com/api"));
    assert_eq!(plan.planned("VCD_ORG"), Some("datacloud"));
    assert_eq!(plan.planned("VCD_VDC"), Some("vdc-datacloud"));
    assert_eq!(plan.planned("VCD_TOKEN"), Some(""));
    assert_eq!(plan.planned("TF_ACC"), None);
    assert_eq!(plan.planned("VCD_ALLOW_UNVERIFIED_SSL"), None);
    assert_eq!(plan.planned("VCD_AUTH_TYPE"), None);
}

#[test]
fn sys_org_defaults_to_org() {
    let prepared =
        prepare(base_config(), &PrepareOptions::default(), &empty_env(), Path::new("/suite"))
            .unwrap();
    assert_eq!(prepared.config.provider.sys_org, "datacloud");
    assert_eq!(prepared.env.planned("VCD_SYS_ORG"), Some("datacloud"));
}

#[test]
fn retry_timeout_defaults_only_when_env_is_empty() {
    let prepared =
        prepare(base_config(), &PrepareOptions::default(), &empty_env(), Path::new("/suite"))
            .unwrap();
    assert_eq!(prepared.env.planned("VCD_MAX_RETRY_TIMEOUT"), Some("300"));

    let mut env = empty_env();
    env.insert("VCD_MAX_RETRY_TIMEOUT".to_string(), "45".to_string());
    let prepared =
        prepare(base_config(), &PrepareOptions::default(), &env, Path::new("/suite")).unwrap();
    assert_eq!(prepared.env.planned("VCD_MAX_RETRY_TIMEOUT"), None);

    let mut config = base_config();
    config.provider.max_retry_timeout = 90;
    let prepared = prepare(config, &PrepareOptions::default(), &env, Path::new("/suite")).unwrap();
    assert_eq!(prepared.env.planned("VCD_MAX_RETRY_TIMEOUT"), Some("90"));
}

#[test]
fn config_env_variables_are_applied_first_and_seen_by_later_rules() {
    let mut config = base_config();
    config.env_variables.insert("VCD_TOKEN".to_string(), "from-config-env".to_string());
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite")).unwrap();
    assert_eq!(prepared.env.assignments()[0].key, "VCD_TOKEN");
    assert_eq!(prepared.config.provider.token, "from-config-env");
}

#[test]
fn env_token_overrides_configured_token() {
    let mut config = base_config();
    config.provider.token = "configured".to_string();
    let mut env = empty_env();
    env.insert("VCD_TOKEN".to_string(), "cli".to_string());
    let prepared = prepare(config, &PrepareOptions::default(), &env, Path::new("/suite")).unwrap();
    assert_eq!(prepared.config.provider.token, "cli");
    assert_eq!(prepared.env.planned("VCD_TOKEN"), None);
}

#[test]
fn token_without_password_uses_placeholder() {
    let mut config = base_config();
    config.provider.password = String::new();
    config.provider.token = "abc".to_string();
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite")).unwrap();
    assert_eq!(prepared.config.provider.password, "TOKEN");
    assert_eq!(prepared.env.planned("VCD_TOKEN"), Some("abc"));
}

#[test]
fn acceptance_saml_and_insecure_flags_export_variables() {
    let mut config = base_config();
    config.provider.terraform_acceptance_tests = true;
    config.provider.use_saml_adfs = true;
    config.provider.custom_adfs_rpt_id = "urn:rpt".to_string();
    config.provider.allow_insecure = true;
    config.provider.use_vcd_connection_cache = true;
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite")).unwrap();
    assert_eq!(prepared.env.planned("TF_ACC"), Some("1"));
    assert_eq!(prepared.env.planned("VCD_AUTH_TYPE"), Some("saml_adfs"));
    assert_eq!(prepared.env.planned("VCD_SAML_ADFS_RPT_ID"), Some("urn:rpt"));
    assert_eq!(prepared.env.planned("VCD_ALLOW_UNVERIFIED_SSL"), Some("1"));
    assert!(prepared.connection_cache);
}

#[test]
fn org_user_requires_credentials() {
    let options = PrepareOptions {
        org_user: true,
    };
    let err = prepare(base_config(), &options, &empty_env(), Path::new("/suite")).unwrap_err();
    assert!(err.to_string().contains("VCD_TEST_ORG_USER was enabled"));
}

#[test]
fn org_user_replaces_credentials_and_sys_org() {
    let mut config = base_config();
    config.provider.sys_org = "System".to_string();
    config.test_env_build.org_user = "orgadmin".to_string();
    config.test_env_build.org_user_password = "orgpass".to_string();
    let options = PrepareOptions {
        org_user: true,
    };
    let prepared = prepare(config, &options, &empty_env(), Path::new("/suite")).unwrap();
    assert_eq!(prepared.config.provider.user, "orgadmin");
    assert_eq!(prepared.config.provider.password, "orgpass");
    assert_eq!(prepared.config.provider.sys_org, "datacloud");
}

#[test]
fn logging_defaults_file_name_when_enabled() {
    let mut config = base_config();
    config.logging.enabled = true;
    config.logging.log_http_response = true;
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite")).unwrap();
    assert!(prepared.logging.enabled);
    assert_eq!(prepared.logging.file_name, DEFAULT_API_LOG_FILE);
    assert!(prepared.logging.http_response);
    assert!(!prepared.logging.http_request);
}

#[test]
fn logging_settings_are_read_from_the_section_alone() {
    let mut config = base_config();
    config.logging.log_file_name = "/var/log/suite.log".to_string();
    assert_eq!(LoggingSettings::from_config(&config), LoggingSettings::default());

    config.logging.enabled = true;
    let settings = LoggingSettings::from_config(&config);
    assert!(settings.enabled);
    assert_eq!(settings.file_name, "/var/log/suite.log");
}

#[test]
fn fixture_paths_become_absolute() {
    let mut config = base_config();
    config.ova.ova_path = "../test-resources/vapp.ova".to_string();
    config.media.media_path = "/isos/test.iso".to_string();
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite/vcd"))
            .unwrap();
    assert!(Path::new(&prepared.config.ova.ova_path).is_absolute());
    assert!(prepared.config.ova.ova_path.starts_with("/suite/vcd"));
    assert_eq!(prepared.config.media.media_path, "/isos/test.iso");
    assert!(prepared.config.ova.ova_vapp_multi_vms_path.is_empty());
}

#[test]
fn suite_names_follow_preconfigured_catalog() {
    let prepared =
        prepare(base_config(), &PrepareOptions::default(), &empty_env(), Path::new("/suite"))
            .unwrap();
    assert_eq!(prepared.names.catalog, "TestSuiteCatalog");
    assert_eq!(prepared.names.catalog_item, "TestSuiteOVA");

    let mut config = base_config();
    config.vcd.catalog.name = "shared".to_string();
    config.vcd.catalog.catalog_item = "photon".to_string();
    let prepared =
        prepare(config, &PrepareOptions::default(), &empty_env(), Path::new("/suite")).unwrap();
    assert_eq!(prepared.names.catalog, "shared");
    assert_eq!(prepared.names.catalog_item, "photon");
}
