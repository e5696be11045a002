//! CORS Suite
//!
//! Exercises the backend's cross-origin handling the way a browser on the
//! frontend origin would: plain requests carrying `Origin`, then a preflight.
//!
//! ## What it checks
//!
//! 1. `/health` answers a cross-origin GET
//! 2. `/api/test-cors` answers a cross-origin GET
//! 3. The preflight (`OPTIONS`) returns the allow-origin and allow-methods headers

use super::descriptor::{Method, ProbeDescriptor};
use super::suite::{Suite, SuitePlan};
use crate::config::TargetConfig;

/// CORS behaviour for the configured frontend origin
pub struct CorsSuite;

impl Suite for CorsSuite {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn description(&self) -> &'static str {
        "Test CORS configuration for production"
    }

    fn plan(&self, target: &TargetConfig) -> SuitePlan {
        let origin = target.origin.as_str();
        let probes = vec![
            ProbeDescriptor::new("Health check", Method::Get, "/health")
                .describe("Cross-origin GET on the health route")
                .with_header("Origin", origin),
            ProbeDescriptor::new("CORS endpoint", Method::Get, "/api/test-cors")
                .describe("Cross-origin GET on the CORS test route")
                .with_header("Origin", origin),
            ProbeDescriptor::new("CORS headers", Method::Options, "/api/test-cors")
                .describe("Preflight request")
                .with_header("Origin", origin)
                .with_header("Access-Control-Request-Method", "GET")
                .with_header("Access-Control-Request-Headers", "Content-Type")
                .expect_header("access-control-allow-origin")
                .expect_header("access-control-allow-methods"),
        ];

        SuitePlan::new(self.name(), self.description(), probes)
    }
}
