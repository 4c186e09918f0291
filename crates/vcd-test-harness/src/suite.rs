// crates/vcd-test-harness/src/suite.rs
// ============================================================================
// Module: Suite Lifecycle
// Description: Entry point that prepares, runs, and cleans up a test suite.
// Purpose: Own the configuration and shared fixtures for the whole run.
// Dependencies: tracing, vcd-test-config
// ============================================================================

//! ## Overview
//! [`SuiteRunner::run`] is the suite `main`: it parses the `vcd-*` flags,
//! loads and prepares the configuration, exports the provider environment,
//! provisions the shared fixtures, runs the test body with a
//! [`SuiteContext`], and removes the fixtures again. Short mode skips every
//! step that needs a live VCD.
//!
//! Any setup failure stops the run: it is printed to stderr once and mapped
//! to a failing exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use vcd_test_config::EnvPlan;
use vcd_test_config::EnvSource;
use vcd_test_config::LoggingSettings;
use vcd_test_config::PrepareOptions;
use vcd_test_config::PreparedConfig;
use vcd_test_config::ProcessEnv;
use vcd_test_config::SuiteResourceNames;
use vcd_test_config::TestConfig;
use vcd_test_config::VcdEnv;
use vcd_test_config::prepare;
use vcd_test_config::resolve_config_path;
use vcd_test_config::set_process_var;

use crate::artifacts::ArtifactRegistry;
use crate::artifacts::TEST_ARTIFACTS_DIR;
use crate::error::HarnessError;
use crate::fixtures::provision_suite_fixtures;
use crate::fixtures::teardown_suite_fixtures;
use crate::flags::SuiteFlags;
use crate::logging::init_logging;
use crate::platform::PlatformConnector;
use crate::template::Caller;
use crate::template::RenderOptions;
use crate::template::TemplateData;
use crate::template::TemplateRenderer;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory holding downloaded fixture files, relative to the base dir.
const TEST_RESOURCES_DIR: &str = "../test-resources";
/// Provider version written into generated provider blocks by default.
const DEFAULT_PROVIDER_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// SECTION: Options
// ============================================================================

/// Filesystem layout and metadata of a suite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteOptions {
    /// Directory holding the test sources and the default config file.
    pub base_dir: PathBuf,
    /// Directory the suite OVA is stored in.
    pub resources_dir: PathBuf,
    /// Directory receiving rendered templates.
    pub artifacts_dir: PathBuf,
    /// Provider version required by generated provider blocks.
    pub provider_version: String,
}

impl SuiteOptions {
    /// Creates the default layout around `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            resources_dir: base_dir.join(TEST_RESOURCES_DIR),
            artifacts_dir: base_dir.join(TEST_ARTIFACTS_DIR),
            provider_version: DEFAULT_PROVIDER_VERSION.to_string(),
            base_dir,
        }
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Everything a test needs from the suite.
#[derive(Debug)]
pub struct SuiteContext {
    /// Prepared configuration.
    config: TestConfig,
    /// Shared fixture names.
    names: SuiteResourceNames,
    /// Parsed flags.
    flags: SuiteFlags,
    /// Client logging settings.
    logging: LoggingSettings,
    /// Reuse authenticated connections.
    connection_cache: bool,
    /// Template renderer for this run.
    renderer: TemplateRenderer,
}

impl SuiteContext {
    /// Builds a context from its parts.
    #[must_use]
    pub fn new(
        prepared: PreparedConfig,
        flags: SuiteFlags,
        options: &SuiteOptions,
    ) -> Self {
        let renderer = TemplateRenderer::new(
            RenderOptions::from(&flags),
            &prepared.config,
            &options.provider_version,
            ArtifactRegistry::new(options.artifacts_dir.clone()),
        );
        Self {
            config: prepared.config,
            names: prepared.names,
            flags,
            logging: prepared.logging,
            connection_cache: prepared.connection_cache,
            renderer,
        }
    }

    /// Returns the prepared configuration.
    #[must_use]
    pub const fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Returns the shared fixture names.
    #[must_use]
    pub const fn names(&self) -> &SuiteResourceNames {
        &self.names
    }

    /// Returns the parsed flags.
    #[must_use]
    pub const fn flags(&self) -> &SuiteFlags {
        &self.flags
    }

    /// Returns the client logging settings.
    #[must_use]
    pub const fn logging(&self) -> &LoggingSettings {
        &self.logging
    }

    /// Returns true when connections should be cached.
    #[must_use]
    pub const fn connection_cache(&self) -> bool {
        self.connection_cache
    }

    /// Returns the template renderer.
    #[must_use]
    pub const fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Renders `tmpl` with `data`; see [`TemplateRenderer::fill`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the artifact cannot be written.
    pub fn fill(
        &self,
        caller: &Caller,
        tmpl: &str,
        data: &TemplateData,
    ) -> Result<String, HarnessError> {
        self.renderer.fill(caller, tmpl, data)
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// How a suite run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    /// The flag listing was printed; nothing ran.
    Help,
    /// The body ran and reported whether every test passed.
    Completed {
        /// True when every test passed.
        passed: bool,
    },
}

/// Drives a suite run against a platform connector.
#[derive(Debug)]
pub struct SuiteRunner<C, E = ProcessEnv> {
    /// Filesystem layout.
    options: SuiteOptions,
    /// Platform client factory.
    connector: C,
    /// Environment the flags and config are read from.
    env: E,
}

impl<C: PlatformConnector> SuiteRunner<C, ProcessEnv> {
    /// Creates a runner that reads the process environment.
    #[must_use]
    pub const fn new(options: SuiteOptions, connector: C) -> Self {
        Self {
            options,
            connector,
            env: ProcessEnv,
        }
    }
}

impl<C: PlatformConnector, E: EnvSource> SuiteRunner<C, E> {
    /// Creates a runner that reads `env` instead of the process environment.
    ///
    /// Environment assignments are still applied to the process.
    #[must_use]
    pub const fn with_env(options: SuiteOptions, connector: C, env: E) -> Self {
        Self {
            options,
            connector,
            env,
        }
    }

    /// Runs the suite and maps the result to an exit code.
    ///
    /// `body` runs the tests and returns true when all of them passed.
    pub fn run<I, S, F>(&self, args: I, body: F) -> ExitCode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce(&SuiteContext) -> bool,
    {
        match self.try_run(args, body) {
            Ok(SuiteOutcome::Help | SuiteOutcome::Completed { passed: true }) => ExitCode::SUCCESS,
            Ok(SuiteOutcome::Completed { passed: false }) => ExitCode::FAILURE,
            Err(err) => {
                let _ = write_stderr_line(&err.to_string());
                ExitCode::FAILURE
            }
        }
    }

    /// Runs the suite and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when flags, configuration, logging, or fixture
    /// setup fail, or when the final fixture teardown cannot connect.
    pub fn try_run<I, S, F>(&self, args: I, body: F) -> Result<SuiteOutcome, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce(&SuiteContext) -> bool,
    {
        let flags = SuiteFlags::from_args(args, &self.env)?;
        if flags.debug {
            set_process_var(VcdEnv::GovcdDebug.as_str(), "1");
        }
        if flags.help {
            write_stdout_text(&flags.help_text())
                .map_err(|err| HarnessError::Setup(format!("could not write help: {err}")))?;
            return Ok(SuiteOutcome::Help);
        }

        let prepared = self.load_config(&flags)?;
        let short = flags.short;
        let prepared = match prepared {
            Some(prepared) => prepared,
            None if short => short_mode_config(),
            None => return Err(HarnessError::Setup("No configuration file found".to_string())),
        };

        if !short {
            self.prepare_fixtures(&prepared)?;
        }

        let context = SuiteContext::new(prepared, flags, &self.options);
        let passed = body(&context);

        if !short {
            if context.config.ova.preserve {
                info!("TestSuite destroy skipped - preserve turned on");
            } else {
                teardown_suite_fixtures(
                    &self.connector,
                    &context.config,
                    &context.logging,
                    &context.names,
                )?;
            }
        }
        Ok(SuiteOutcome::Completed {
            passed,
        })
    }

    /// Loads, prepares, and applies the configuration when a file exists.
    fn load_config(&self, flags: &SuiteFlags) -> Result<Option<PreparedConfig>, HarnessError> {
        let Some(path) = resolve_config_path(&self.env, &self.options.base_dir) else {
            init_logging(flags, &LoggingSettings::default())?;
            return Ok(None);
        };
        let config = TestConfig::load(&path)?;
        init_logging(flags, &LoggingSettings::from_config(&config))?;
        info!(path = %path.display(), "configuration loaded");
        let options = PrepareOptions {
            org_user: flags.test_org_user,
        };
        let prepared = prepare(config, &options, &self.env, &self.options.base_dir)?;
        prepared.env.apply();
        Ok(Some(prepared))
    }

    /// Logs the connection banner, runs the optional cleanup, and provisions.
    fn prepare_fixtures(&self, prepared: &PreparedConfig) -> Result<(), HarnessError> {
        let config = &prepared.config;
        info!("Connecting to {}", config.provider.url);
        info!(
            "as user {}@{} (using {})",
            config.provider.user,
            config.provider.sys_org,
            config.auth_type().banner_label()
        );

        let env = prepared.env.overlay(&self.env);
        if env.is_set(VcdEnv::SuiteCleanup.as_str()) {
            info!("VCD_TEST_SUITE_CLEANUP found and TestSuite resource cleanup initiated");
            teardown_suite_fixtures(&self.connector, config, &prepared.logging, &prepared.names)?;
        }

        let ova_path = suite_ova_path(&self.options.resources_dir, config);
        provision_suite_fixtures(
            &self.connector,
            config,
            &prepared.logging,
            &prepared.names,
            &ova_path,
        )?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the local path of the suite OVA.
fn suite_ova_path(resources_dir: &Path, config: &TestConfig) -> PathBuf {
    resources_dir.join(&config.ova.ova_test_file_name)
}

/// Configuration used in short mode when no file exists.
fn short_mode_config() -> PreparedConfig {
    PreparedConfig {
        config: TestConfig::default(),
        env: EnvPlan::new(),
        logging: LoggingSettings::default(),
        names: SuiteResourceNames::default(),
        connection_cache: false,
    }
}

/// Writes text to stdout unchanged.
fn write_stdout_text(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

/// Writes a message line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
