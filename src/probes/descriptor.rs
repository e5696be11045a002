//! Probe descriptors
//!
//! A [`ProbeDescriptor`] declares one HTTP check: what to request and what the
//! response must contain. Descriptors are plain data; they are built once at
//! startup and never mutated while a run is in progress.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method used by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted path into a JSON document, e.g. `environment.NODE_ENV`
///
/// Numeric segments also index into arrays (`items.0.id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

/// Result of resolving a [`FieldPath`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldLookup<'v> {
    Present(&'v Value),
    /// A key along the path is missing, or the value is `null`
    Absent,
}

impl<'v> FieldLookup<'v> {
    pub fn value(&self) -> Option<&'v Value> {
        match self {
            FieldLookup::Present(value) => Some(value),
            FieldLookup::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldLookup::Present(_))
    }
}

impl FieldPath {
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk the path; never fails, a broken path is simply `Absent`
    pub fn lookup<'v>(&self, root: &'v Value) -> FieldLookup<'v> {
        let mut current = root;
        for segment in &self.segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return FieldLookup::Absent,
            }
        }
        if current.is_null() {
            FieldLookup::Absent
        } else {
            FieldLookup::Present(current)
        }
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Expectation applied to an extracted body field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    /// Field equals the given JSON value
    Equals(Value),
    /// Field exists and is not `null`
    Present,
    /// Field is truthy in the JavaScript sense
    Truthy,
}

impl Expectation {
    pub fn is_met(&self, lookup: FieldLookup<'_>) -> bool {
        match (self, lookup) {
            (Expectation::Equals(expected), FieldLookup::Present(actual)) => actual == expected,
            (Expectation::Present, FieldLookup::Present(_)) => true,
            (Expectation::Truthy, FieldLookup::Present(actual)) => is_truthy(actual),
            (_, FieldLookup::Absent) => false,
        }
    }
}

/// JavaScript truthiness: `false`, `0`, `""` and `null` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One body-field expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyCheck {
    pub field: FieldPath,
    pub expect: Expectation,
}

impl BodyCheck {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: FieldPath::new(field),
            expect: Expectation::Equals(value.into()),
        }
    }

    pub fn present(field: &str) -> Self {
        Self {
            field: FieldPath::new(field),
            expect: Expectation::Present,
        }
    }

    pub fn truthy(field: &str) -> Self {
        Self {
            field: FieldPath::new(field),
            expect: Expectation::Truthy,
        }
    }
}

/// Declaration of a single HTTP probe
///
/// ## Example
///
/// ```
/// use railcheck::probes::{BodyCheck, Method, ProbeDescriptor};
///
/// let probe = ProbeDescriptor::new("Health Check", Method::Get, "/health")
///     .describe("Basic backend connectivity")
///     .with_header("Origin", "https://kingeasyearn.com")
///     .expect_body(BodyCheck::equals("environment.NODE_ENV", "production"))
///     .expect_header("access-control-allow-origin");
///
/// assert_eq!(probe.body_checks.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub method: Method,
    pub path: String,
    /// Request headers, sent in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_checks: Vec<BodyCheck>,
    /// Response header names that must be present (case-insensitive)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_checks: Vec<String>,
}

impl ProbeDescriptor {
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            method,
            path: path.into(),
            headers: IndexMap::new(),
            body_checks: Vec::new(),
            header_checks: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn expect_body(mut self, check: BodyCheck) -> Self {
        self.body_checks.push(check);
        self
    }

    pub fn expect_header(mut self, name: impl Into<String>) -> Self {
        self.header_checks.push(name.into());
        self
    }

    /// Number of validator checks this probe will produce on success
    pub fn check_count(&self) -> usize {
        self.body_checks.len() + self.header_checks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let body = json!({"environment": {"NODE_ENV": "production"}});
        let path = FieldPath::new("environment.NODE_ENV");
        assert_eq!(path.lookup(&body), FieldLookup::Present(&json!("production")));
    }

    #[test]
    fn test_lookup_missing_intermediate_is_absent() {
        let body = json!({"status": "ok"});
        assert_eq!(
            FieldPath::new("environment.NODE_ENV").lookup(&body),
            FieldLookup::Absent
        );
        // Descending into a scalar is also just absent
        assert_eq!(
            FieldPath::new("status.inner").lookup(&body),
            FieldLookup::Absent
        );
    }

    #[test]
    fn test_lookup_null_is_absent() {
        let body = json!({"environment": {"MONGODB_URI": null}});
        assert!(!FieldPath::new("environment.MONGODB_URI").lookup(&body).is_present());
    }

    #[test]
    fn test_lookup_array_index() {
        let body = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(
            FieldPath::new("items.1.id").lookup(&body).value(),
            Some(&json!(2))
        );
        assert!(!FieldPath::new("items.5.id").lookup(&body).is_present());
        assert!(!FieldPath::new("items.x").lookup(&body).is_present());
    }

    #[test]
    fn test_empty_path_is_root() {
        let body = json!("plain");
        assert!(FieldPath::new("").is_empty());
        assert_eq!(FieldPath::new("").lookup(&body).value(), Some(&body));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1.5)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_expectations() {
        let value = json!("production");
        let present = FieldLookup::Present(&value);
        assert!(Expectation::Equals(json!("production")).is_met(present));
        assert!(!Expectation::Equals(json!("staging")).is_met(present));
        assert!(Expectation::Present.is_met(present));
        assert!(Expectation::Truthy.is_met(present));
        assert!(!Expectation::Present.is_met(FieldLookup::Absent));
        assert!(!Expectation::Truthy.is_met(FieldLookup::Absent));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(Method::Get.to_reqwest(), reqwest::Method::GET);
        let parsed: Method = serde_json::from_str("\"OPTIONS\"").unwrap();
        assert_eq!(parsed, Method::Options);
    }

    #[test]
    fn test_descriptor_deserialize() {
        let probe: ProbeDescriptor = serde_json::from_value(json!({
            "name": "Health Check",
            "path": "/health",
            "body_checks": [
                {"field": "environment.NODE_ENV", "expect": {"kind": "equals", "value": "production"}},
                {"field": "environment.MONGODB_URI", "expect": {"kind": "present"}}
            ],
            "header_checks": ["access-control-allow-origin"]
        }))
        .unwrap();

        assert_eq!(probe.method, Method::Get);
        assert_eq!(probe.body_checks[0], BodyCheck::equals("environment.NODE_ENV", "production"));
        assert_eq!(probe.body_checks[1], BodyCheck::present("environment.MONGODB_URI"));
        assert_eq!(probe.check_count(), 3);
    }
}
