//! Command-line overrides and suite selection

use std::time::Duration;

use super::target::{Config, ConfigError};
use crate::probes::{DEFAULT_SUITE, SUITES, SuitePlan, registry::get_suite};

/// Target settings given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub base_url: Option<String>,
    pub origin: Option<String>,
    /// Raw `Name: value` strings
    pub headers: Vec<String>,
    /// Duration such as `10s` or `500ms`
    pub timeout: Option<String>,
}

impl Config {
    /// Layer command-line values over the loaded target
    pub fn apply_overrides(&mut self, overrides: TargetOverrides) -> Result<(), ConfigError> {
        if let Some(base_url) = overrides.base_url {
            self.target.base_url = base_url;
        }
        if let Some(origin) = overrides.origin {
            self.target.origin = origin;
        }
        if let Some(timeout) = overrides.timeout {
            self.target.timeout = parse_timeout(&timeout)?;
        }
        for raw in &overrides.headers {
            let (name, value) = parse_header(raw)?;
            self.target.headers.insert(name, value);
        }
        Ok(())
    }

    /// Pick the suite to run
    ///
    /// The explicit name wins, then `default_suite`, then the built-in
    /// default. Suites declared in the file shadow built-ins of the same name.
    pub fn resolve_plan(&self, suite: Option<&str>) -> Result<SuitePlan, ConfigError> {
        let name = suite
            .or(self.default_suite.as_deref())
            .unwrap_or(DEFAULT_SUITE);

        if let Some(custom) = self.suite(name) {
            return Ok(custom.to_plan(name));
        }
        if let Some(builtin) = get_suite(name) {
            return Ok(builtin.plan(&self.target));
        }

        let mut available: Vec<String> = SUITES.keys().map(|k| k.to_string()).collect();
        available.extend(
            self.suites
                .keys()
                .filter(|k| !SUITES.contains_key(k.as_str()))
                .cloned(),
        );
        Err(ConfigError::UnknownSuite {
            name: name.to_string(),
            available,
        })
    }
}

/// Split `Name: value` on the first colon, so values may contain colons
pub fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidHeader(raw.to_string())),
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).map_err(|source| ConfigError::InvalidTimeout {
        value: raw.to_string(),
        source,
    })
}
