// crates/vcd-test-config/src/env.rs
// ============================================================================
// Module: Suite Environment
// Description: Environment lookups and deferred environment assignments.
// Purpose: Keep process env mutation in one audited place.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Configuration preparation reads the environment through [`EnvSource`] and
//! records writes in an [`EnvPlan`]. Lookups made through the plan observe
//! earlier assignments, so later rules see the values earlier rules set.
//! [`EnvPlan::apply`] is the only function that mutates the process env.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read or written by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcdEnv {
    /// Custom configuration file path.
    Config,
    /// Terraform acceptance-test switch.
    TfAcc,
    /// Provider retry timeout in seconds.
    MaxRetryTimeout,
    /// Login user.
    User,
    /// Login password.
    Password,
    /// API token.
    Token,
    /// Authentication type override.
    AuthType,
    /// ADFS relaying party trust identifier.
    SamlAdfsRptId,
    /// API endpoint.
    Url,
    /// Login organization.
    SysOrg,
    /// Tenant organization.
    Org,
    /// Virtual datacenter.
    Vdc,
    /// Skip TLS verification.
    AllowUnverifiedSsl,
    /// Remove leftover suite fixtures before the run.
    SuiteCleanup,
    /// Client library debug output.
    GovcdDebug,
}

impl VcdEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "VCD_CONFIG",
            Self::TfAcc => "TF_ACC",
            Self::MaxRetryTimeout => "VCD_MAX_RETRY_TIMEOUT",
            Self::User => "VCD_USER",
            Self::Password => "VCD_PASSWORD",
            Self::Token => "VCD_TOKEN",
            Self::AuthType => "VCD_AUTH_TYPE",
            Self::SamlAdfsRptId => "VCD_SAML_ADFS_RPT_ID",
            Self::Url => "VCD_URL",
            Self::SysOrg => "VCD_SYS_ORG",
            Self::Org => "VCD_ORG",
            Self::Vdc => "VCD_VDC",
            Self::AllowUnverifiedSsl => "VCD_ALLOW_UNVERIFIED_SSL",
            Self::SuiteCleanup => "VCD_TEST_SUITE_CLEANUP",
            Self::GovcdDebug => "GOVCD_DEBUG",
        }
    }
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Returns the value of `key`, or `None` when unset or not UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` only when it is set and non-empty.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }

    /// Returns true when `key` is set to a non-empty value.
    fn is_set(&self, key: &str) -> bool {
        self.non_empty(key).is_some()
    }
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

// ============================================================================
// SECTION: Deferred Assignments
// ============================================================================

/// One pending environment assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    /// Variable name.
    pub key: String,
    /// Value to assign.
    pub value: String,
}

/// Ordered environment assignments layered over a base source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPlan {
    /// Assignments in the order they were recorded.
    assignments: Vec<EnvAssignment>,
}

impl EnvPlan {
    /// Creates an empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    /// Records an assignment.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.assignments.push(EnvAssignment {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Returns the recorded assignments in order.
    #[must_use]
    pub fn assignments(&self) -> &[EnvAssignment] {
        &self.assignments
    }

    /// Returns the last value recorded for `key`.
    #[must_use]
    pub fn planned(&self, key: &str) -> Option<&str> {
        self.assignments
            .iter()
            .rev()
            .find(|assignment| assignment.key == key)
            .map(|assignment| assignment.value.as_str())
    }

    /// Returns a source that resolves `key` from this plan first, then `base`.
    pub const fn overlay<'a, E: EnvSource + ?Sized>(&'a self, base: &'a E) -> PlannedEnv<'a, E> {
        PlannedEnv {
            plan: self,
            base,
        }
    }

    /// Writes every assignment into the process environment, in order.
    pub fn apply(&self) {
        for assignment in &self.assignments {
            set_process_var(&assignment.key, &assignment.value);
        }
    }
}

/// Environment view combining pending assignments with a base source.
#[derive(Debug)]
pub struct PlannedEnv<'a, E: ?Sized> {
    /// Pending assignments.
    plan: &'a EnvPlan,
    /// Fallback source.
    base: &'a E,
}

impl<E: EnvSource + ?Sized> EnvSource for PlannedEnv<'_, E> {
    fn var(&self, key: &str) -> Option<String> {
        self.plan.planned(key).map(str::to_string).or_else(|| self.base.var(key))
    }
}

// ============================================================================
// SECTION: Process Mutation
// ============================================================================

/// Sets an environment variable for the current process.
#[allow(unsafe_code, reason = "Suite setup mutates process env before tests start.")]
pub fn set_process_var(key: &str, value: &str) {
    // SAFETY: The suite runner applies env changes from a single thread before
    // test bodies run; concurrent readers do not exist at that point.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Removes an environment variable from the current process.
#[allow(unsafe_code, reason = "Suite helpers clear process env between test phases.")]
pub fn remove_process_var(key: &str) {
    // SAFETY: Callers serialize env mutation; the suite runs tests sequentially.
    unsafe {
        std::env::remove_var(key);
    }
}
