//! Target and suite configuration types
//!
//! Defines the structure for configuration files. Every field has a default,
//! so an empty file (or no file at all) targets the production deployment.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::probes::{BodyCheck, Method, ProbeDescriptor, SuitePlan};
use crate::runner::{DEFAULT_TIMEOUT, RunError, RunSettings};

/// Production backend the harness was written for
pub const DEFAULT_BASE_URL: &str = "https://easyearn-backend-production-01ac.up.railway.app";

/// Frontend origin the backend must accept
pub const DEFAULT_ORIGIN: &str = "https://kingeasyearn.com";

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown suite '{name}' (available: {})", .available.join(", "))]
    UnknownSuite { name: String, available: Vec<String> },

    #[error("Invalid header '{0}': expected 'Name: value'")]
    InvalidHeader(String),

    #[error("Invalid timeout '{value}': {source}")]
    InvalidTimeout {
        value: String,
        source: humantime::DurationError,
    },

    #[error(transparent)]
    Plan(#[from] RunError),
}

/// The service under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL every probe path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin presented by the built-in CORS probes
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Hard limit for each request
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Headers forwarded on every probe (probe headers take precedence)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            timeout: DEFAULT_TIMEOUT,
            headers: IndexMap::new(),
        }
    }
}

impl TargetConfig {
    /// Build validated run settings from this target
    pub fn to_run_settings(&self) -> Result<RunSettings, ConfigError> {
        let mut settings = RunSettings::new(&self.base_url)?.with_timeout(self.timeout)?;
        for (name, value) in &self.headers {
            settings = settings.with_forwarded_header(name, value)?;
        }
        Ok(settings)
    }
}

/// A probe suite declared in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub description: String,

    pub probes: Vec<ProbeDescriptor>,

    /// Checklist printed when the suite fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remediation: Vec<String>,

    /// Notes printed when the suite passes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_notes: Vec<String>,
}

impl SuiteConfig {
    pub fn to_plan(&self, name: &str) -> SuitePlan {
        let mut plan = SuitePlan::new(name, &self.description, self.probes.clone());
        if !self.remediation.is_empty() {
            plan.remediation = self.remediation.clone();
        }
        plan.success_notes = self.success_notes.clone();
        plan
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    /// Suite run when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_suite: Option<String>,

    /// Additional suites (suite_name -> definition)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub suites: IndexMap<String, SuiteConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Get a custom suite definition
    pub fn suite(&self, name: &str) -> Option<&SuiteConfig> {
        self.suites.get(name)
    }

    /// Fail fast on anything that would break a run before it starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = self.target.to_run_settings()?;

        for (name, suite) in &self.suites {
            if suite.probes.is_empty() {
                return Err(ConfigError::Invalid(format!("suite '{name}' has no probes")));
            }
            for probe in &suite.probes {
                if probe.name.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "suite '{name}' has a probe without a name"
                    )));
                }
                if let Some(check) = probe.body_checks.iter().find(|c| c.field.is_empty()) {
                    return Err(ConfigError::Invalid(format!(
                        "probe '{}' has a body check with an empty field path ({:?})",
                        probe.name, check.expect
                    )));
                }
                settings.prepare(probe)?;
            }
        }

        Ok(())
    }

    /// Generate a default configuration with an example suite
    pub fn default_config() -> Self {
        let target = TargetConfig::default();
        let mut suites = IndexMap::new();
        suites.insert(
            "smoke".to_string(),
            SuiteConfig {
                description: "Minimal reachability check".to_string(),
                probes: vec![
                    ProbeDescriptor::new("Health Check", Method::Get, "/health")
                        .describe("Backend responds with a JSON health document")
                        .with_header("Origin", &target.origin)
                        .expect_body(BodyCheck::present("environment")),
                ],
                remediation: Vec::new(),
                success_notes: Vec::new(),
            },
        );

        Config {
            target,
            default_suite: None,
            suites,
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
