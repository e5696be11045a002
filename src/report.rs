//! Report rendering
//!
//! Line-oriented, human-readable output for a run. The printer only reads
//! results; it has no say in the verdict.

use std::io::{self, Write};

use crate::client::ResponseBody;
use crate::config::TargetConfig;
use crate::probes::SuitePlan;
use crate::runner::{AggregateReport, ProbeOutcome, ProbeResult};

const RULE_WIDTH: usize = 60;

/// Longest body excerpt printed with `show_body`
const BODY_EXCERPT_LIMIT: usize = 500;

/// Rendering switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Echo each response body under its probe
    pub show_body: bool,
}

/// Writes a run report to any [`Write`] sink
pub struct ReportPrinter<W> {
    out: W,
    options: ReportOptions,
}

impl<W: Write> ReportPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Suite title and target
    pub fn banner(&mut self, plan: &SuitePlan, target: &TargetConfig) -> io::Result<()> {
        writeln!(self.out, "{}", title(plan))?;
        writeln!(self.out, "{}", rule())?;
        writeln!(self.out, "Backend URL:  {}", target.base_url)?;
        writeln!(self.out, "Frontend URL: {}", target.origin)?;
        for (name, value) in &target.headers {
            writeln!(self.out, "Forwarding:   {name}: {value}")?;
        }
        writeln!(self.out)
    }

    /// One probe, numbered from 1
    pub fn probe(&mut self, index: usize, total: usize, result: &ProbeResult) -> io::Result<()> {
        let descriptor = &result.descriptor;
        if descriptor.description.is_empty() {
            writeln!(self.out, "[{}/{}] {}", index + 1, total, descriptor.name)?;
        } else {
            writeln!(
                self.out,
                "[{}/{}] {}: {}",
                index + 1,
                total,
                descriptor.name,
                descriptor.description
            )?;
        }
        writeln!(self.out, "   {} {}", descriptor.method, descriptor.path)?;

        match &result.outcome {
            ProbeOutcome::Success(response) => {
                writeln!(self.out, "   Status: {}", response.status)?;
                if !response.is_success() {
                    writeln!(
                        self.out,
                        "   Note: unexpected status {} (informational)",
                        response.status
                    )?;
                    if let Some(message) = server_message(&response.body) {
                        writeln!(self.out, "   Error: {message}")?;
                    }
                }
                if self.options.show_body {
                    writeln!(self.out, "   Body: {}", excerpt(&response.body))?;
                }
            }
            ProbeOutcome::Failure(failure) => {
                writeln!(self.out, "   Error: {} ({})", failure.kind, failure.kind.hint())?;
                if !failure.message.is_empty() {
                    writeln!(self.out, "   Detail: {}", failure.message)?;
                }
            }
        }

        for check in &result.checks {
            let marker = if check.passed { "PASS" } else { "FAIL" };
            writeln!(self.out, "   {marker} {}", check.label)?;
        }

        let verdict = if result.passed { "PASSED" } else { "FAILED" };
        writeln!(self.out, "   Result: {verdict}")?;
        writeln!(self.out)
    }

    /// Overall verdict plus the suite's static guidance
    pub fn summary(&mut self, report: &AggregateReport, plan: &SuitePlan) -> io::Result<()> {
        writeln!(self.out, "{}", rule())?;
        if report.all_passed {
            writeln!(
                self.out,
                "ALL PROBES PASSED ({}/{})",
                report.passed_count(),
                report.results.len()
            )?;
            if !plan.success_notes.is_empty() {
                writeln!(self.out)?;
                for note in &plan.success_notes {
                    writeln!(self.out, "{note}")?;
                }
            }
        } else {
            writeln!(
                self.out,
                "{} of {} probes FAILED",
                report.failed_count(),
                report.results.len()
            )?;
            let failed: Vec<_> = report
                .results
                .iter()
                .filter(|r| !r.passed)
                .map(ProbeResult::name)
                .collect();
            writeln!(self.out, "Failed: {}", failed.join(", "))?;
            if !plan.remediation.is_empty() {
                writeln!(self.out)?;
                writeln!(self.out, "Please check:")?;
                for (i, item) in plan.remediation.iter().enumerate() {
                    writeln!(self.out, "   {}. {item}", i + 1)?;
                }
            }
        }
        writeln!(self.out, "{}", rule())
    }

    /// Structured summary as pretty JSON
    pub fn json_summary(&mut self, report: &AggregateReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &report.summary())?;
        writeln!(self.out)
    }
}

fn title(plan: &SuitePlan) -> &str {
    if plan.description.is_empty() {
        &plan.name
    } else {
        &plan.description
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// The server's own explanation of an error response
///
/// Prefers a JSON `message` string, otherwise the body itself.
fn server_message(body: &ResponseBody) -> Option<String> {
    match body {
        ResponseBody::Empty => None,
        ResponseBody::Json(value) => match value.get("message") {
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            _ => Some(excerpt(body)),
        },
        ResponseBody::Text(_) => Some(excerpt(body)),
    }
}

fn excerpt(body: &ResponseBody) -> String {
    let text = body.to_string();
    match text.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
