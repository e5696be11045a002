//! HTTP transport
//!
//! The executor never talks to `reqwest` directly. It goes through the
//! [`Transport`] trait so tests can substitute scripted responses, and all
//! error classification happens here, once, at the boundary.

use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as _;
use thiserror::Error;

use super::types::{CapturedResponse, FailureKind, ProbeRequest, ResponseBody, ResponseHeaders};

/// User agent sent with every probe
const USER_AGENT: &str = concat!("railcheck/", env!("CARGO_PKG_VERSION"));

/// Largest response body kept in memory; anything beyond is dropped
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// A request that produced no HTTP response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a `reqwest` error and capture its full diagnostic chain
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        Self::new(classify(err), error_chain(err))
    }
}

/// The HTTP client capability used by the probe executor
///
/// Implementations perform exactly one attempt per call. Any status code is
/// a successful exchange; only failures to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ProbeRequest) -> Result<CapturedResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client
///
/// # Example
/// ```no_run
/// use railcheck::client::ReqwestTransport;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::new()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    body_limit: usize,
}

impl ReqwestTransport {
    /// Build a transport with the default client settings
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::from_reqwest(&e))?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap the bytes read from each response body
    ///
    /// A longer body is cut at the limit and kept as text.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ProbeRequest) -> Result<CapturedResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.clone())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let mut headers = ResponseHeaders::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }

        let body = read_body(response, self.body_limit)
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        Ok(CapturedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Read at most `limit` bytes of the body, chunk by chunk
async fn read_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<ResponseBody, reqwest::Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - bytes.len();
        if chunk.len() > room {
            bytes.extend_from_slice(&chunk[..room]);
            tracing::debug!(limit, "Response body truncated");
            return Ok(ResponseBody::truncated(&bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(ResponseBody::decode(&bytes))
}

/// Map a `reqwest` error onto the fixed failure taxonomy
fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::Timeout;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return FailureKind::ConnectionRefused,
                std::io::ErrorKind::TimedOut => return FailureKind::Timeout,
                _ => {}
            }
        }
        source = cause.source();
    }

    classify_message(&error_chain(err)).unwrap_or(FailureKind::Other)
}

/// Fallback classification from diagnostic text
///
/// hyper reports resolver failures as opaque boxed errors, so the text is the
/// only reliable signal for DNS problems.
fn classify_message(chain: &str) -> Option<FailureKind> {
    let lower = chain.to_ascii_lowercase();
    if lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
    {
        Some(FailureKind::NameResolutionFailure)
    } else if lower.contains("connection refused") {
        Some(FailureKind::ConnectionRefused)
    } else if lower.contains("timed out") {
        Some(FailureKind::Timeout)
    } else {
        None
    }
}

/// Render an error and all of its sources as `outer: inner: root`
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dns_message() {
        assert_eq!(
            classify_message("error sending request: client error (Connect): dns error: failed to lookup address information: Name or service not known"),
            Some(FailureKind::NameResolutionFailure)
        );
    }

    #[test]
    fn test_classify_refused_message() {
        assert_eq!(
            classify_message("error sending request: tcp connect error: Connection refused (os error 111)"),
            Some(FailureKind::ConnectionRefused)
        );
    }

    #[test]
    fn test_classify_unknown_message() {
        assert_eq!(classify_message("invalid certificate"), None);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let outer = std::io::Error::other(inner);
        let chain = error_chain(&outer);
        assert!(chain.contains("refused"));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new(FailureKind::ConnectionRefused, "tcp connect error");
        assert_eq!(err.to_string(), "connection refused: tcp connect error");
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
