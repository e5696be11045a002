//! Run settings and request planning
//!
//! Everything that can be wrong with a descriptor list is detected here,
//! before the first request goes out.

use indexmap::IndexMap;
use reqwest::header::{HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::executor::DEFAULT_TIMEOUT;
use crate::client::ProbeRequest;
use crate::probes::ProbeDescriptor;

/// Misconfiguration detected before any probe executes
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Probe '{probe}' has an invalid path '{path}': {source}")]
    InvalidPath {
        probe: String,
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header '{name}'{}", on_probe(.probe))]
    InvalidHeader { probe: Option<String>, name: String },

    #[error("Timeout must be greater than zero")]
    InvalidTimeout,

    #[error("No probes to run")]
    EmptyPlan,
}

/// Target address, forwarded headers and timeout for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    base_url: Url,
    forwarded_headers: IndexMap<String, String>,
    timeout: Duration,
}

impl RunSettings {
    /// Settings for the given base URL; only `http` and `https` are accepted
    pub fn new(base_url: &str) -> Result<Self, RunError> {
        let invalid = |reason: String| RunError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        Ok(Self {
            base_url: url,
            forwarded_headers: IndexMap::new(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RunError> {
        if timeout.is_zero() {
            return Err(RunError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Add a header sent with every probe
    pub fn with_forwarded_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, RunError> {
        let (name, value) = (name.into(), value.into());
        check_header(None, &name, &value)?;
        self.forwarded_headers.insert(name, value);
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn forwarded_headers(&self) -> &IndexMap<String, String> {
        &self.forwarded_headers
    }

    /// Resolve a descriptor into the exact request that will be sent
    ///
    /// The path is appended to the base URL verbatim, so a base URL with a
    /// path prefix keeps it. Forwarded headers come first; a probe header
    /// with the same name (case-insensitive) replaces the forwarded one.
    pub fn prepare(&self, descriptor: &ProbeDescriptor) -> Result<ProbeRequest, RunError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = if descriptor.path.starts_with('/') {
            format!("{base}{}", descriptor.path)
        } else {
            format!("{base}/{}", descriptor.path)
        };
        let url = Url::parse(&raw).map_err(|source| RunError::InvalidPath {
            probe: descriptor.name.clone(),
            path: descriptor.path.clone(),
            source,
        })?;

        let mut headers: IndexMap<String, String> = self
            .forwarded_headers
            .iter()
            .filter(|(name, _)| {
                !descriptor
                    .headers
                    .keys()
                    .any(|own| own.eq_ignore_ascii_case(name))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in &descriptor.headers {
            check_header(Some(&descriptor.name), name, value)?;
            headers.insert(name.clone(), value.clone());
        }

        Ok(ProbeRequest {
            method: descriptor.method,
            url,
            headers,
            timeout: self.timeout,
        })
    }
}

fn on_probe(probe: &Option<String>) -> String {
    probe
        .as_ref()
        .map(|p| format!(" on probe '{p}'"))
        .unwrap_or_default()
}

fn check_header(probe: Option<&str>, name: &str, value: &str) -> Result<(), RunError> {
    let valid =
        HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok();
    if valid {
        Ok(())
    } else {
        Err(RunError::InvalidHeader {
            probe: probe.map(str::to_string),
            name: name.to_string(),
        })
    }
}
