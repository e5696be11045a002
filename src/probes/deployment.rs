//! Deployment Suite
//!
//! Checks that a fresh deployment came up at all.
//!
//! ## What it checks
//!
//! 1. `/health` answers and reports its runtime environment
//! 2. The CORS test endpoint answers for the frontend origin
//! 3. The root endpoint answers
//!
//! A 502 on every probe usually means the application crashed on startup,
//! which is what the remediation checklist walks through.

use super::descriptor::{BodyCheck, Method, ProbeDescriptor};
use super::suite::{Suite, SuitePlan};
use crate::config::TargetConfig;

const REMEDIATION: &[&str] = &[
    "If every probe fails with 502, the application is likely crashing on startup",
    "Set the missing environment variables (MONGODB_URI, SESSION_SECRET) in the Railway dashboard",
    "Check the Railway logs for startup errors and port configuration issues",
    "Redeploy the application",
];

/// Deployment status suite
pub struct DeploymentSuite;

impl Suite for DeploymentSuite {
    fn name(&self) -> &'static str {
        "deployment"
    }

    fn description(&self) -> &'static str {
        "Check Railway deployment status"
    }

    fn plan(&self, target: &TargetConfig) -> SuitePlan {
        let origin = target.origin.as_str();
        let probes = vec![
            ProbeDescriptor::new("Health Check", Method::Get, "/health")
                .describe("Backend reports its environment")
                .with_header("Origin", origin)
                .expect_body(BodyCheck::present("environment.NODE_ENV"))
                .expect_body(BodyCheck::truthy("environment.MONGODB_URI"))
                .expect_body(BodyCheck::truthy("environment.SESSION_SECRET")),
            ProbeDescriptor::new("CORS Test", Method::Get, "/api/test-cors")
                .describe("CORS endpoint reachable from the frontend origin")
                .with_header("Origin", origin),
            ProbeDescriptor::new("Root Endpoint", Method::Get, "/")
                .describe("Root route answers")
                .with_header("Origin", origin),
        ];

        SuitePlan::new(self.name(), self.description(), probes).with_remediation(REMEDIATION)
    }
}
