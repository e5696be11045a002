//! Probe results and the aggregate report

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::executor::ProbeOutcome;
use crate::client::FailureKind;
use crate::probes::{CheckOutcome, ProbeDescriptor};

/// Result of one probe, owned by the runner for the duration of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub descriptor: ProbeDescriptor,
    pub outcome: ProbeOutcome,
    /// Validator output; empty when the request failed
    pub checks: Vec<CheckOutcome>,
    /// Response received and every check passed
    pub passed: bool,
    pub duration: Duration,
}

impl ProbeResult {
    pub fn new(
        descriptor: ProbeDescriptor,
        outcome: ProbeOutcome,
        checks: Vec<CheckOutcome>,
        duration: Duration,
    ) -> Self {
        let passed = outcome.is_success() && checks.iter().all(|c| c.passed);
        Self {
            descriptor,
            outcome,
            checks,
            passed,
            duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Machine-readable view, without timing
    pub fn summary(&self) -> ProbeSummary {
        let (status, error_kind, error) = match &self.outcome {
            ProbeOutcome::Success(response) => (Some(response.status), None, None),
            ProbeOutcome::Failure(failure) => {
                (None, Some(failure.kind), Some(failure.message.clone()))
            }
        };
        ProbeSummary {
            name: self.descriptor.name.clone(),
            passed: self.passed,
            status,
            error_kind,
            error,
            checks: self.checks.clone(),
        }
    }
}

/// Ordered results of one run and the verdict derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    pub results: Vec<ProbeResult>,
    pub all_passed: bool,
}

impl AggregateReport {
    pub fn new(results: Vec<ProbeResult>) -> Self {
        let all_passed = results.iter().all(|r| r.passed);
        Self {
            results,
            all_passed,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    /// Process exit code: 0 when every probe passed
    pub fn exit_code(&self) -> i32 {
        if self.all_passed { 0 } else { 1 }
    }

    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            all_passed: self.all_passed,
            results: self.results.iter().map(ProbeResult::summary).collect(),
        }
    }
}

/// Structured summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub all_passed: bool,
    pub results: Vec<ProbeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSummary {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: Vec<CheckOutcome>,
}
