// crates/vcd-test-harness/src/template.rs
// ============================================================================
// Module: Template Rendering
// Description: Fills Terraform snippets and records them as artifacts.
// Purpose: Give every test a reproducible, inspectable configuration text.
// Dependencies: regex, serde_json, time, vcd-test-config
// ============================================================================

//! ## Overview
//! Test snippets use `{{.Name}}` placeholders. [`TemplateRenderer::fill`]
//! substitutes them from a [`TemplateData`] map, marks any variable the test
//! forgot to supply, optionally prepends a provider block built from the
//! configuration, and stores the result under the artifacts directory named
//! after the calling test.
//!
//! Missing values never abort rendering: they render as a visible marker so
//! the failure shows up in the Terraform error output and in the artifact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::format_description;
use vcd_test_config::DEFAULT_API_LOG_FILE;
use vcd_test_config::TestConfig;

use crate::artifacts::ArtifactRegistry;
use crate::error::HarnessError;
use crate::flags::SuiteFlags;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provider block prepended to snippets when requested.
pub const PROVIDER_TEMPLATE: &str = r#"
# tags {{.Tags}}
# dirname {{.DirName}}
# comment {{.Comment}}
# date {{.Timestamp}}
# file {{.CallerFileName}}
#

provider "vcd" {
  user                 = "{{.User}}"
  password             = "{{.Password}}"
  token                = "{{.Token}}"
  auth_type            = "{{.AuthType}}"
  saml_adfs_rpt_id     = "{{.SamlAdfsCustomRptId}}"
  url                  = "{{.Url}}"
  sysorg               = "{{.SysOrg}}"
  org                  = "{{.Org}}"
  vdc                  = "{{.Vdc}}"
  allow_unverified_ssl = "{{.AllowInsecure}}"
  max_retry_timeout    = {{.MaxRetryTimeout}}
  version              = "~> {{.VersionRequired}}"
  logging              = {{.Logging}}
  logging_file         = "{{.LoggingFile}}"
}
"#;

/// Artifact name prefix used when `Prefix` is not supplied.
const DEFAULT_PREFIX: &str = "vcd";
/// Tag set used when `Tags` is not supplied.
const DEFAULT_TAGS: &str = "ALL";

/// Placeholder pattern, capturing the variable name.
#[allow(clippy::expect_used, reason = "Pattern is a compile-time literal.")]
static TEMPLATE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\.([^{}]+)\}\}").expect("template variable pattern"));

/// `org =` assignment preceded by whitespace.
#[allow(clippy::expect_used, reason = "Pattern is a compile-time literal.")]
static ORG_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s)org\s*=").expect("org assignment pattern"));

/// `vdc =` assignment preceded by whitespace.
#[allow(clippy::expect_used, reason = "Pattern is a compile-time literal.")]
static VDC_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s)vdc\s*=").expect("vdc assignment pattern"));

// ============================================================================
// SECTION: Caller Identity
// ============================================================================

/// Identifies the test function that renders a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Full function path, e.g. `vcd_tests::catalog::test_catalog_basic`.
    pub function: String,
    /// Source file of the call site.
    pub file: String,
}

impl Caller {
    /// Creates a caller from a function path and a file name.
    #[must_use]
    pub fn new(function: impl Into<String>, file: impl Into<String>) -> Self {
        let function = function.into();
        let trimmed = trim_closures(&function).to_string();
        Self {
            function: trimmed,
            file: file.into(),
        }
    }

    /// Returns `module.function`, the default artifact name.
    #[must_use]
    pub fn short_name(&self) -> String {
        let mut segments = self.function.rsplit("::");
        match (segments.next(), segments.next()) {
            (Some(function), Some(module)) => format!("{module}.{function}"),
            (Some(function), None) => function.to_string(),
            _ => self.function.clone(),
        }
    }
}

/// Strips trailing `{{closure}}` segments from a function path.
fn trim_closures(path: &str) -> &str {
    let mut current = path;
    while let Some(stripped) = current.strip_suffix("::{{closure}}") {
        current = stripped;
    }
    current
}

/// Captures the enclosing function and source file as a [`Caller`].
#[macro_export]
macro_rules! caller {
    () => {{
        /// Marker whose type name carries the enclosing function path.
        fn here() {}
        /// Returns the type name of the argument.
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(here);
        $crate::template::Caller::new(name.strip_suffix("::here").unwrap_or(name), file!())
    }};
}

// ============================================================================
// SECTION: Template Data
// ============================================================================

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateData {
    /// Variable name to value.
    values: BTreeMap<String, Value>,
}

impl TemplateData {
    /// Creates an empty data set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Adds a value and returns the data set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns true when `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Inserts `value` only when `key` is absent.
    fn insert_default(&mut self, key: &str, value: impl Into<Value>) {
        if !self.values.contains_key(key) {
            self.values.insert(key.to_string(), value.into());
        }
    }

    /// Returns the value for `key` rendered as template text.
    fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(value_text)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TemplateData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}

/// Renders a JSON value the way it appears in Terraform text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns the distinct placeholder names in `tmpl`, in first-seen order.
#[must_use]
pub fn template_vars(tmpl: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in TEMPLATE_VAR.captures_iter(tmpl) {
        if let Some(name) = capture.get(1) {
            let name = name.as_str();
            if !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Switches that change how templates are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prepend the provider block.
    pub add_provider: bool,
    /// Comment out `org` and `vdc` assignments.
    pub remove_org_vdc: bool,
    /// Do not write artifacts.
    pub skip_write: bool,
}

impl From<&SuiteFlags> for RenderOptions {
    fn from(flags: &SuiteFlags) -> Self {
        Self {
            add_provider: flags.add_provider,
            remove_org_vdc: flags.remove_org_vdc_from_template,
            skip_write: flags.skip_template_write,
        }
    }
}

/// Fills templates for a suite run.
#[derive(Debug)]
pub struct TemplateRenderer {
    /// Rendering switches.
    options: RenderOptions,
    /// Values used by the provider block.
    provider: TemplateData,
    /// Artifact sink.
    artifacts: ArtifactRegistry,
}

impl TemplateRenderer {
    /// Creates a renderer whose provider block reflects `config`.
    #[must_use]
    pub fn new(
        options: RenderOptions,
        config: &TestConfig,
        provider_version: &str,
        artifacts: ArtifactRegistry,
    ) -> Self {
        Self {
            options,
            provider: provider_data(config, provider_version),
            artifacts,
        }
    }

    /// Returns the rendering switches.
    #[must_use]
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Returns the artifact registry.
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactRegistry {
        &self.artifacts
    }

    /// Renders `tmpl` with `data` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Template`] when the timestamp cannot be
    /// formatted, and [`HarnessError::Artifact`] when the artifact cannot be
    /// written (including a second write from the same artifact name).
    pub fn fill(
        &self,
        caller: &Caller,
        tmpl: &str,
        data: &TemplateData,
    ) -> Result<String, HarnessError> {
        let mut data = data.clone();
        let mut artifact_name = caller.short_name();

        for name in template_vars(tmpl) {
            if !data.contains_key(&name) {
                let marker = format!("*** MISSING FIELD [{name}] from func {artifact_name}");
                data.insert(name, marker);
            }
        }

        let prefix = data.text("Prefix").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if let Some(func_name) = data.text("FuncName") {
            artifact_name = format!("{prefix}.{func_name}");
        }

        let mut source = String::new();
        if self.options.add_provider {
            source.push_str(PROVIDER_TEMPLATE);
            for (key, value) in &self.provider.values {
                data.insert(key.clone(), value.clone());
            }
        }
        source.push_str(tmpl);

        data.insert_default("Tags", DEFAULT_TAGS);
        data.insert_default("Comment", "");
        data.insert_default("DirName", "");
        data.insert_default("CallerFileName", caller.file.clone());
        data.insert("Timestamp", timestamp()?);

        let mut rendered = substitute(&source, &data);
        if self.options.remove_org_vdc {
            rendered = comment_out_org_vdc(&rendered);
        }

        if !self.options.skip_write {
            self.artifacts.write(&artifact_name, &caller.function, &rendered)?;
        }
        Ok(rendered)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the provider block values from the configuration.
fn provider_data(config: &TestConfig, provider_version: &str) -> TemplateData {
    let provider = &config.provider;
    let logging_file = if config.logging.log_file_name.is_empty() {
        DEFAULT_API_LOG_FILE.to_string()
    } else {
        config.logging.log_file_name.clone()
    };
    TemplateData::new()
        .with("User", provider.user.clone())
        .with("Password", provider.password.clone())
        .with("SamlAdfsCustomRptId", provider.custom_adfs_rpt_id.clone())
        .with("Token", provider.token.clone())
        .with("Url", provider.url.clone())
        .with("SysOrg", provider.sys_org.clone())
        .with("Org", config.vcd.org.clone())
        .with("Vdc", config.vcd.vdc.clone())
        .with("AllowInsecure", provider.allow_insecure)
        .with("MaxRetryTimeout", provider.max_retry_timeout)
        .with("VersionRequired", provider_version)
        .with("Logging", config.logging.enabled)
        .with("LoggingFile", logging_file)
        .with("AuthType", config.auth_type().as_str())
}

/// Replaces every placeholder that has a value in `data`.
fn substitute(source: &str, data: &TemplateData) -> String {
    TEMPLATE_VAR
        .replace_all(source, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| data.text(name.as_str()))
                .or_else(|| caps.get(0).map(|whole| whole.as_str().to_string()))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Comments out `org =` and `vdc =` assignments, keeping the indentation.
fn comment_out_org_vdc(text: &str) -> String {
    let without_org = ORG_ASSIGNMENT.replace_all(text, "${1}# org = ");
    VDC_ASSIGNMENT.replace_all(&without_org, "${1}# vdc = ").into_owned()
}

/// Returns the current UTC time formatted for the `Timestamp` header.
///
/// UTC is used because the local offset cannot be determined reliably once the
/// process runs more than one thread.
fn timestamp() -> Result<String, HarnessError> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Formats `moment` as `YYYY-MM-DD HH:MM`.
pub(crate) fn format_timestamp(moment: OffsetDateTime) -> Result<String, HarnessError> {
    moment
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|err| HarnessError::Template(format!("timestamp formatting failed: {err}")))
}
