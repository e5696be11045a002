//! Verification runner
//!
//! Walks a probe list strictly in order, one request at a time. A failed
//! probe never stops the run: every descriptor is attempted so a single run
//! yields as much diagnostic information as possible.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::executor::{ProbeExecutor, ProbeOutcome};
use super::result::{AggregateReport, ProbeResult};
use super::settings::{RunError, RunSettings};
use crate::client::{ProbeRequest, Transport};
use crate::probes::{ProbeDescriptor, validate_response};

/// Runs probe lists against a single target
///
/// # Example
/// ```no_run
/// use railcheck::client::ReqwestTransport;
/// use railcheck::probes::{Method, ProbeDescriptor};
/// use railcheck::runner::{RunSettings, VerificationRunner};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = RunSettings::new("https://backend.example.com")?;
/// let runner = VerificationRunner::new(ReqwestTransport::new()?, settings);
///
/// let probes = vec![ProbeDescriptor::new("Health Check", Method::Get, "/health")];
/// let report = runner.run(&probes).await?;
/// println!("all passed: {}", report.all_passed);
/// # Ok(())
/// # }
/// ```
pub struct VerificationRunner<T> {
    executor: ProbeExecutor<T>,
}

impl<T: Transport> VerificationRunner<T> {
    pub fn new(transport: T, settings: RunSettings) -> Self {
        Self {
            executor: ProbeExecutor::new(transport, settings),
        }
    }

    pub fn settings(&self) -> &RunSettings {
        self.executor.settings()
    }

    /// Resolve every descriptor up front
    ///
    /// Any misconfiguration aborts here, before a single request is sent.
    pub fn plan(&self, probes: &[ProbeDescriptor]) -> Result<Vec<ProbeRequest>, RunError> {
        if probes.is_empty() {
            return Err(RunError::EmptyPlan);
        }
        probes
            .iter()
            .map(|p| self.executor.settings().prepare(p))
            .collect()
    }

    /// Run all probes and build the aggregate report
    pub async fn run(&self, probes: &[ProbeDescriptor]) -> Result<AggregateReport, RunError> {
        self.run_with(probes, |_, _| {}).await
    }

    /// Run all probes, handing each result to `on_result` as soon as it exists
    ///
    /// `on_result` receives the zero-based index of the probe.
    pub async fn run_with<F>(
        &self,
        probes: &[ProbeDescriptor],
        mut on_result: F,
    ) -> Result<AggregateReport, RunError>
    where
        F: FnMut(usize, &ProbeResult),
    {
        let requests = self.plan(probes)?;

        info!(
            target_url = %self.settings().base_url(),
            probes = probes.len(),
            "Starting verification run"
        );

        let mut results = Vec::with_capacity(probes.len());
        for (index, (descriptor, request)) in probes.iter().zip(&requests).enumerate() {
            let start = Instant::now();
            info!(
                probe = %descriptor.name,
                method = %descriptor.method,
                path = %descriptor.path,
                "Running probe"
            );

            let outcome = self.executor.send(request).await;
            let checks = match &outcome {
                ProbeOutcome::Success(response) => validate_response(descriptor, response),
                // Nothing to validate without a response
                ProbeOutcome::Failure(_) => Vec::new(),
            };

            let result = ProbeResult::new(descriptor.clone(), outcome, checks, start.elapsed());
            log_result(&result);

            on_result(index, &result);
            results.push(result);
        }

        let report = AggregateReport::new(results);
        if report.all_passed {
            info!(probes = report.results.len(), "All probes PASSED");
        } else {
            warn!(
                failed = report.failed_count(),
                probes = report.results.len(),
                "Some probes FAILED"
            );
        }

        Ok(report)
    }
}

fn log_result(result: &ProbeResult) {
    match &result.outcome {
        ProbeOutcome::Success(response) if result.passed => {
            info!(
                probe = %result.name(),
                status = response.status,
                duration_ms = result.duration.as_millis(),
                "Probe passed"
            );
        }
        ProbeOutcome::Success(response) => {
            warn!(
                probe = %result.name(),
                status = response.status,
                failed_checks = result.failed_checks().count(),
                "Probe failed validation"
            );
            for check in result.failed_checks() {
                debug!(probe = %result.name(), check = %check.label, "Check failed");
            }
        }
        ProbeOutcome::Failure(failure) => {
            warn!(
                probe = %result.name(),
                kind = %failure.kind,
                error = %failure.message,
                "Probe failed"
            );
        }
    }
}
