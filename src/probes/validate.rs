//! Response validators
//!
//! Validators are pure: they inspect a captured response and produce labelled
//! pass/fail lines. They never return errors; a body that cannot be inspected
//! is itself reported as a failed check.

use serde::{Deserialize, Serialize};

use super::descriptor::{BodyCheck, Expectation, FieldLookup, ProbeDescriptor};
use crate::client::{CapturedResponse, ResponseBody, ResponseHeaders};

/// Result of one validator check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub label: String,
    pub passed: bool,
}

impl CheckOutcome {
    pub fn passed(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: true,
        }
    }

    pub fn failed(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: false,
        }
    }
}

/// Anything that can judge a captured response
pub trait Validator {
    fn validate(&self, response: &CapturedResponse) -> Vec<CheckOutcome>;
}

impl Validator for BodyCheck {
    fn validate(&self, response: &CapturedResponse) -> Vec<CheckOutcome> {
        vec![body_field(&response.body, self)]
    }
}

/// Expected response headers, matched case-insensitively
pub struct HeaderPresence<'a>(pub &'a [String]);

impl Validator for HeaderPresence<'_> {
    fn validate(&self, response: &CapturedResponse) -> Vec<CheckOutcome> {
        header_presence(&response.headers, self.0)
    }
}

/// Evaluate a single body-field expectation
pub fn body_field(body: &ResponseBody, check: &BodyCheck) -> CheckOutcome {
    let expectation = describe(check);

    let root = match body {
        ResponseBody::Json(value) => value,
        ResponseBody::Text(_) => {
            return CheckOutcome::failed(format!("{expectation} (body is not JSON)"));
        }
        ResponseBody::Empty => {
            return CheckOutcome::failed(format!("{expectation} (body is empty)"));
        }
    };

    let lookup = check.field.lookup(root);
    if check.expect.is_met(lookup) {
        return CheckOutcome::passed(expectation);
    }

    let detail = match (lookup, &check.expect) {
        (FieldLookup::Absent, _) => "absent".to_string(),
        (FieldLookup::Present(actual), Expectation::Equals(_)) => format!("got {actual}"),
        // Presence checks often guard secrets; never echo their value
        (FieldLookup::Present(_), _) => "falsy".to_string(),
    };
    CheckOutcome::failed(format!("{expectation} ({detail})"))
}

/// Check each expected header name against the response headers
pub fn header_presence(headers: &ResponseHeaders, names: &[String]) -> Vec<CheckOutcome> {
    names
        .iter()
        .map(|name| {
            let name = name.to_ascii_lowercase();
            match headers.get(&name) {
                Some(value) => CheckOutcome::passed(format!("{name}: {value}")),
                None => CheckOutcome::failed(format!("{name}: missing")),
            }
        })
        .collect()
}

/// Run every validator attached to a descriptor, in declaration order
pub fn validate_response(
    descriptor: &ProbeDescriptor,
    response: &CapturedResponse,
) -> Vec<CheckOutcome> {
    let headers = HeaderPresence(&descriptor.header_checks);
    let mut validators: Vec<&dyn Validator> = descriptor
        .body_checks
        .iter()
        .map(|c| c as &dyn Validator)
        .collect();
    validators.push(&headers);

    validators
        .into_iter()
        .flat_map(|v| v.validate(response))
        .collect()
}

fn describe(check: &BodyCheck) -> String {
    match &check.expect {
        Expectation::Equals(value) => format!("{} == {}", check.field, value),
        Expectation::Present => format!("{} is set", check.field),
        Expectation::Truthy => format!("{} is truthy", check.field),
    }
}
