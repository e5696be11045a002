//! Probe execution
//!
//! - [`RunSettings`] resolves descriptors into requests and rejects
//!   misconfiguration before anything is sent
//! - [`ProbeExecutor`] sends one request per probe with a hard timeout
//! - [`VerificationRunner`] walks the probe list in order and folds the
//!   per-probe verdicts into an [`AggregateReport`]

mod executor;
mod result;
mod settings;
#[cfg(test)]
pub(crate) mod testing;
mod verify;

pub use executor::{DEFAULT_TIMEOUT, ProbeExecutor, ProbeFailure, ProbeOutcome};
pub use result::{AggregateReport, ProbeResult, ProbeSummary, Summary};
pub use settings::{RunError, RunSettings};
pub use verify::VerificationRunner;
