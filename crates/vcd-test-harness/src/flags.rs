// crates/vcd-test-harness/src/flags.rs
// ============================================================================
// Module: Suite Flags
// Description: Boolean `vcd-*` command-line flags with environment seeding.
// Purpose: Let one switch be set from either the command line or the env.
// Dependencies: clap, vcd-test-config
// ============================================================================

//! ## Overview
//! Every flag is a boolean. Its default is on when the seeding environment
//! variable holds a non-empty value; the command line overrides the default
//! (`-vcd-x` or `-vcd-x=true` turns it on, `-vcd-x=false` turns it off).
//! Arguments that do not start with `vcd-` (after leading dashes) belong to
//! the test runner and are ignored; `-vcd-help` and `--vcd-help` are
//! equivalent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use clap::Parser;
use clap::builder::BoolishValueParser;
use vcd_test_config::EnvSource;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix shared by every suite flag.
const FLAG_PREFIX: &str = "vcd-";
/// Program name handed to clap.
const PROGRAM_NAME: &str = "vcd-acceptance";
/// Width of the flag name column in the help listing.
const HELP_NAME_WIDTH: usize = 40;

// ============================================================================
// SECTION: Flag Catalog
// ============================================================================

/// Identifies one suite flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuiteFlag {
    /// Show vcd flags.
    Help,
    /// Enable distributed network tests.
    TestDistributed,
    /// Enable client library debug output.
    Debug,
    /// Enable verbose output.
    Verbose,
    /// Enable function call tracing.
    Trace,
    /// Run the short test mode without platform connections.
    Short,
    /// Add the provider block to rendered templates.
    AddProvider,
    /// Skip writing rendered templates to files.
    SkipTemplateWrite,
    /// Comment out org and vdc in rendered templates.
    RemoveOrgVdcFromTemplate,
    /// Run tests with the org user.
    TestOrgUser,
}

impl SuiteFlag {
    /// All flags, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Help,
        Self::TestDistributed,
        Self::Debug,
        Self::Verbose,
        Self::Trace,
        Self::Short,
        Self::AddProvider,
        Self::SkipTemplateWrite,
        Self::RemoveOrgVdcFromTemplate,
        Self::TestOrgUser,
    ];

    /// Returns the flag name without dashes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "vcd-help",
            Self::TestDistributed => "vcd-test-distributed",
            Self::Debug => "vcd-debug",
            Self::Verbose => "vcd-verbose",
            Self::Trace => "vcd-trace",
            Self::Short => "vcd-short",
            Self::AddProvider => "vcd-add-provider",
            Self::SkipTemplateWrite => "vcd-skip-template-write",
            Self::RemoveOrgVdcFromTemplate => "vcd-remove-org-vdc-from-template",
            Self::TestOrgUser => "vcd-test-org-user",
        }
    }

    /// Returns the environment variable that seeds the flag.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::Help => "VCD_HELP",
            Self::TestDistributed => "VCD_TEST_DISTRIBUTED_NETWORK",
            Self::Debug => "GOVCD_DEBUG",
            Self::Verbose => "TEST_VERBOSE",
            Self::Trace => "GOVCD_TRACE",
            Self::Short => "VCD_SHORT_TEST",
            Self::AddProvider => "VCD_ADD_PROVIDER",
            Self::SkipTemplateWrite => "VCD_SKIP_TEMPLATE_WRITING",
            Self::RemoveOrgVdcFromTemplate => "REMOVE_ORG_VDC_FROM_TEMPLATE",
            Self::TestOrgUser => "VCD_TEST_ORG_USER",
        }
    }

    /// Returns the help line for the flag.
    #[must_use]
    pub const fn help(self) -> &'static str {
        match self {
            Self::Help => "Show vcd flags",
            Self::TestDistributed => "enables testing of distributed network",
            Self::Debug => "enables debug output",
            Self::Verbose => "enables verbose output",
            Self::Trace => "enables function calls tracing",
            Self::Short => "runs short test",
            Self::AddProvider => "add provider to test scripts",
            Self::SkipTemplateWrite => "Skip writing templates to file",
            Self::RemoveOrgVdcFromTemplate => "Remove org and VDC from template",
            Self::TestOrgUser => "Run tests with org user",
        }
    }
}

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Raw command-line values; `None` when a flag was not given.
///
/// Each flag takes an optional `=value`, so `-vcd-short`, `-vcd-short=true`,
/// and `-vcd-short=false` all parse. A repeated flag keeps its last value.
#[derive(Parser, Debug)]
#[command(
    name = PROGRAM_NAME,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct FlagArgs {
    /// Show vcd flags.
    #[arg(
        long = "vcd-help",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    help: Option<bool>,
    /// Enable distributed network tests.
    #[arg(
        long = "vcd-test-distributed",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    test_distributed: Option<bool>,
    /// Enable client library debug output.
    #[arg(
        long = "vcd-debug",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    debug: Option<bool>,
    /// Enable verbose output.
    #[arg(
        long = "vcd-verbose",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    verbose: Option<bool>,
    /// Enable function call tracing.
    #[arg(
        long = "vcd-trace",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    trace: Option<bool>,
    /// Run the short test mode.
    #[arg(
        long = "vcd-short",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    short: Option<bool>,
    /// Add the provider block to rendered templates.
    #[arg(
        long = "vcd-add-provider",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    add_provider: Option<bool>,
    /// Skip writing rendered templates.
    #[arg(
        long = "vcd-skip-template-write",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    skip_template_write: Option<bool>,
    /// Comment out org and vdc in rendered templates.
    #[arg(
        long = "vcd-remove-org-vdc-from-template",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    remove_org_vdc_from_template: Option<bool>,
    /// Run tests with the org user.
    #[arg(
        long = "vcd-test-org-user",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    test_org_user: Option<bool>,
}

impl FlagArgs {
    /// Returns the command-line value of `flag`, if one was given.
    const fn value(&self, flag: SuiteFlag) -> Option<bool> {
        match flag {
            SuiteFlag::Help => self.help,
            SuiteFlag::TestDistributed => self.test_distributed,
            SuiteFlag::Debug => self.debug,
            SuiteFlag::Verbose => self.verbose,
            SuiteFlag::Trace => self.trace,
            SuiteFlag::Short => self.short,
            SuiteFlag::AddProvider => self.add_provider,
            SuiteFlag::SkipTemplateWrite => self.skip_template_write,
            SuiteFlag::RemoveOrgVdcFromTemplate => self.remove_org_vdc_from_template,
            SuiteFlag::TestOrgUser => self.test_org_user,
        }
    }
}

// ============================================================================
// SECTION: Parsed Flags
// ============================================================================

/// Parsed suite flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteFlags {
    /// Show vcd flags.
    pub help: bool,
    /// Enable distributed network tests.
    pub test_distributed: bool,
    /// Enable client library debug output.
    pub debug: bool,
    /// Enable verbose output.
    pub verbose: bool,
    /// Enable function call tracing.
    pub trace: bool,
    /// Run the short test mode.
    pub short: bool,
    /// Add the provider block to rendered templates.
    pub add_provider: bool,
    /// Skip writing rendered templates.
    pub skip_template_write: bool,
    /// Comment out org and vdc in rendered templates.
    pub remove_org_vdc_from_template: bool,
    /// Run tests with the org user.
    pub test_org_user: bool,
}

impl SuiteFlags {
    /// Parses the process arguments on top of the defaults seeded from `env`.
    ///
    /// The first element of `args` is the program name and is skipped. A flag
    /// given on the command line wins over its environment variable, so
    /// `-vcd-short=false` turns short mode off even with `VCD_SHORT_TEST` set.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Flags`] for an unknown `vcd-*` flag or a
    /// malformed value.
    pub fn from_args<I, S>(args: I, env: &impl EnvSource) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suite_args = args.into_iter().skip(1).filter_map(|arg| normalize_arg(arg.as_ref()));
        let parsed =
            FlagArgs::try_parse_from(std::iter::once(PROGRAM_NAME.to_string()).chain(suite_args))
                .map_err(|err| HarnessError::Flags(err.to_string()))?;
        let mut flags = Self::env_defaults(env);
        for flag in SuiteFlag::ALL {
            if let Some(value) = parsed.value(flag) {
                flags.set(flag, value);
            }
        }
        Ok(flags)
    }

    /// Returns the defaults: a flag is on when its variable is non-empty.
    #[must_use]
    pub fn env_defaults(env: &impl EnvSource) -> Self {
        let mut flags = Self::default();
        for flag in SuiteFlag::ALL {
            flags.set(flag, env.is_set(flag.env_var()));
        }
        flags
    }

    /// Returns the value of `flag`.
    #[must_use]
    pub const fn get(&self, flag: SuiteFlag) -> bool {
        match flag {
            SuiteFlag::Help => self.help,
            SuiteFlag::TestDistributed => self.test_distributed,
            SuiteFlag::Debug => self.debug,
            SuiteFlag::Verbose => self.verbose,
            SuiteFlag::Trace => self.trace,
            SuiteFlag::Short => self.short,
            SuiteFlag::AddProvider => self.add_provider,
            SuiteFlag::SkipTemplateWrite => self.skip_template_write,
            SuiteFlag::RemoveOrgVdcFromTemplate => self.remove_org_vdc_from_template,
            SuiteFlag::TestOrgUser => self.test_org_user,
        }
    }

    /// Sets `flag` to `value`.
    pub const fn set(&mut self, flag: SuiteFlag, value: bool) {
        match flag {
            SuiteFlag::Help => self.help = value,
            SuiteFlag::TestDistributed => self.test_distributed = value,
            SuiteFlag::Debug => self.debug = value,
            SuiteFlag::Verbose => self.verbose = value,
            SuiteFlag::Trace => self.trace = value,
            SuiteFlag::Short => self.short = value,
            SuiteFlag::AddProvider => self.add_provider = value,
            SuiteFlag::SkipTemplateWrite => self.skip_template_write = value,
            SuiteFlag::RemoveOrgVdcFromTemplate => self.remove_org_vdc_from_template = value,
            SuiteFlag::TestOrgUser => self.test_org_user = value,
        }
    }

    /// Renders the `vcd flags:` listing, sorted by flag name.
    #[must_use]
    pub fn help_text(&self) -> String {
        let mut flags = SuiteFlag::ALL;
        flags.sort_by_key(|flag| flag.name());
        let mut out = String::from("vcd flags:\n\n");
        for flag in flags {
            let _ = writeln!(
                out,
                "  -{:<width$} {} ({})",
                flag.name(),
                flag.help(),
                self.get(flag),
                width = HELP_NAME_WIDTH
            );
        }
        out.push('\n');
        out
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rewrites a suite flag to clap's `--name` form; drops foreign arguments.
fn normalize_arg(arg: &str) -> Option<String> {
    let bare = arg.trim_start_matches('-');
    if bare.len() == arg.len() || !bare.starts_with(FLAG_PREFIX) {
        return None;
    }
    Some(format!("--{bare}"))
}
