//! Probe declarations, validators and suites
//!
//! This module provides the [`ProbeDescriptor`] data model, the pure
//! response validators, and the built-in suites.
//!
//! ## Built-in Suites
//!
//! - **config**: production mode, secrets, CORS endpoint and preflight headers
//! - **deployment**: is the deployment up at all
//! - **cors**: cross-origin requests and preflight
//!
//! ## Adding New Suites
//!
//! 1. Create a new file in `src/probes/` (e.g., `mysuite.rs`)
//! 2. Implement the `Suite` trait
//! 3. Register in `registry.rs`
//! 4. Add to `mod.rs` exports

mod cors;
mod deployment;
mod descriptor;
mod railway_config;
pub mod registry;
mod suite;
mod validate;

pub use cors::CorsSuite;
pub use deployment::DeploymentSuite;
pub use descriptor::*;
pub use railway_config::RailwayConfigSuite;
pub use registry::{DEFAULT_SUITE, SUITES};
pub use suite::{DEFAULT_REMEDIATION, Suite, SuitePlan};
pub use validate::{
    CheckOutcome, HeaderPresence, Validator, body_field, header_presence, validate_response,
};
