//! Suite trait and plans
//!
//! A suite is a named, ordered probe list plus the static text shown at the
//! end of a run. Built-in suites are registered in `registry.rs`; more can be
//! declared in the configuration file.

use serde::{Deserialize, Serialize};

use super::descriptor::ProbeDescriptor;
use crate::config::TargetConfig;

/// Checklist shown when a suite has no remediation of its own
pub const DEFAULT_REMEDIATION: &[&str] = &[
    "Confirm the latest build is deployed and the service is running",
    "Check the service logs for startup errors",
    "Verify the required environment variables are set",
];

/// Everything needed to run and report one suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitePlan {
    pub name: String,
    pub description: String,
    pub probes: Vec<ProbeDescriptor>,
    /// Printed when the run fails
    pub remediation: Vec<String>,
    /// Printed when the run passes
    pub success_notes: Vec<String>,
}

impl SuitePlan {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        probes: Vec<ProbeDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            probes,
            remediation: lines(DEFAULT_REMEDIATION),
            success_notes: Vec::new(),
        }
    }

    pub fn with_remediation(mut self, remediation: &[&str]) -> Self {
        self.remediation = lines(remediation);
        self
    }

    pub fn with_success_notes(mut self, notes: Vec<String>) -> Self {
        self.success_notes = notes;
        self
    }
}

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

/// A compiled-in probe suite
///
/// ## Example Implementation
///
/// ```ignore
/// use railcheck::config::TargetConfig;
/// use railcheck::probes::{Method, ProbeDescriptor, Suite, SuitePlan};
///
/// pub struct StatusSuite;
///
/// impl Suite for StatusSuite {
///     fn name(&self) -> &'static str { "status" }
///     fn description(&self) -> &'static str { "Status page is up" }
///
///     fn plan(&self, target: &TargetConfig) -> SuitePlan {
///         SuitePlan::new(self.name(), self.description(), vec![
///             ProbeDescriptor::new("Status", Method::Get, "/status"),
///         ])
///     }
/// }
/// ```
pub trait Suite: Send + Sync {
    /// Unique name (used in CLI and config)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Build the probe list for a target
    fn plan(&self, target: &TargetConfig) -> SuitePlan;
}
