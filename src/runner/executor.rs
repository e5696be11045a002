//! Probe executor
//!
//! Sends exactly one request per probe through the injected [`Transport`]
//! and turns whatever happens into a [`ProbeOutcome`]. The executor applies
//! its own deadline on top of the transport's, so a transport that never
//! returns still produces a `Timeout` failure.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::settings::RunSettings;
use crate::client::{CapturedResponse, FailureKind, ProbeRequest, Transport};
use crate::probes::ProbeDescriptor;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened when a probe was sent
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// A response arrived, whatever its status code
    Success(CapturedResponse),
    /// No response was obtained
    Failure(ProbeFailure),
}

/// Classified failure with the transport's diagnostic text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ProbeOutcome::Failure(ProbeFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }

    pub fn response(&self) -> Option<&CapturedResponse> {
        match self {
            ProbeOutcome::Success(response) => Some(response),
            ProbeOutcome::Failure(_) => None,
        }
    }
}

/// Executes probes against one target
pub struct ProbeExecutor<T> {
    transport: T,
    settings: RunSettings,
}

impl<T: Transport> ProbeExecutor<T> {
    pub fn new(transport: T, settings: RunSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Resolve and send one probe
    ///
    /// A descriptor that cannot be resolved is reported as an `Other` failure;
    /// callers that need fail-fast behaviour resolve with
    /// [`RunSettings::prepare`] first.
    pub async fn execute(&self, descriptor: &ProbeDescriptor) -> ProbeOutcome {
        match self.settings.prepare(descriptor) {
            Ok(request) => self.send(&request).await,
            Err(e) => ProbeOutcome::failure(FailureKind::Other, e.to_string()),
        }
    }

    /// Send an already resolved request, once
    pub async fn send(&self, request: &ProbeRequest) -> ProbeOutcome {
        debug!(
            method = %request.method,
            url = %request.url,
            headers = ?request.headers,
            "Sending request"
        );

        match tokio::time::timeout(request.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => {
                debug!(url = %request.url, status = response.status, "Response received");
                ProbeOutcome::Success(response)
            }
            Ok(Err(e)) => {
                warn!(url = %request.url, kind = %e.kind, error = %e.message, "Request failed");
                ProbeOutcome::failure(e.kind, e.message)
            }
            Err(_) => {
                warn!(url = %request.url, timeout = ?request.timeout, "Request timed out");
                ProbeOutcome::failure(
                    FailureKind::Timeout,
                    format!(
                        "no response within {}",
                        humantime::format_duration(request.timeout)
                    ),
                )
            }
        }
    }
}
