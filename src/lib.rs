//! railcheck - deployment verification harness
//!
//! Runs an ordered list of HTTP probes against a deployed service, checks
//! each response against declared expectations and folds everything into a
//! single pass/fail verdict suitable for a CI or deploy gate.
//!
//! ## Modules
//!
//! - [`client`] - HTTP transport seam and captured response types
//! - [`probes`] - probe descriptors, validators and built-in suites
//! - [`runner`] - sequential execution and the aggregate report
//! - [`report`] - human-readable and JSON output
//! - [`config`] - target configuration and YAML-defined suites

pub mod client;
pub mod config;
pub mod probes;
pub mod report;
pub mod runner;
