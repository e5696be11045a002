//! Probe request/response types
//!
//! These are the values that cross the transport boundary: a fully resolved
//! request going out, and either a captured response or a classified failure
//! coming back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::probes::Method;

/// A request ready to hand to a [`Transport`](super::Transport)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: Url,
    /// Headers in the order they will be sent
    pub headers: IndexMap<String, String>,
    pub timeout: Duration,
}

/// Response headers keyed by lowercased name
///
/// Repeated headers are joined with `", "` as HTTP allows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, String>",
    into = "IndexMap<String, String>"
)]
pub struct ResponseHeaders(IndexMap<String, String>);

impl From<IndexMap<String, String>> for ResponseHeaders {
    fn from(map: IndexMap<String, String>) -> Self {
        map.into_iter()
            .fold(Self::new(), |headers, (name, value)| headers.with(&name, value))
    }
}

impl From<ResponseHeaders> for IndexMap<String, String> {
    fn from(headers: ResponseHeaders) -> Self {
        headers.0
    }
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, merging with an existing value of the same name
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Builder form of [`append`](Self::append)
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
    /// Body parsed as JSON
    Json(serde_json::Value),
    /// Non-empty body that is not valid JSON
    Text(String),
    Empty,
}

impl ResponseBody {
    /// A body cut short at the size limit; never parsed as JSON
    pub fn truncated(bytes: &[u8]) -> Self {
        ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Decode raw bytes, preferring JSON and falling back to lossy text
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return ResponseBody::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{value}"),
            ResponseBody::Text(text) => write!(f, "{text}"),
            ResponseBody::Empty => write!(f, "<empty>"),
        }
    }
}

/// A completed HTTP exchange, whatever its status code
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
    pub body: ResponseBody,
}

impl CapturedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: ResponseHeaders::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = ResponseBody::Json(body);
        self
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = ResponseBody::Text(body.into());
        self
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Classification of a request that never produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConnectionRefused,
    NameResolutionFailure,
    Timeout,
    Other,
}

impl FailureKind {
    /// Connection or DNS level failure (everything except a timeout)
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, FailureKind::Timeout)
    }

    /// Short operator-facing hint
    pub fn hint(&self) -> &'static str {
        match self {
            FailureKind::ConnectionRefused | FailureKind::NameResolutionFailure => {
                "Server not reachable"
            }
            FailureKind::Timeout => "Request timeout",
            FailureKind::Other => "Request failed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ConnectionRefused => write!(f, "connection refused"),
            FailureKind::NameResolutionFailure => write!(f, "name resolution failure"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Other => write!(f, "transport error"),
        }
    }
}
