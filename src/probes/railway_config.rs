//! Railway Config Suite
//!
//! Verifies both the deployment configuration and the CORS fix: the backend
//! must run in production mode with its secrets configured, recognise the
//! frontend origin, and answer preflights with the full set of CORS headers.
//!
//! ## Options
//!
//! Uses `target.origin` for the origin the backend must echo back.

use serde_json::json;

use super::descriptor::{BodyCheck, Method, ProbeDescriptor};
use super::suite::{Suite, SuitePlan};
use crate::config::TargetConfig;

const REMEDIATION: &[&str] = &[
    "Environment variables are set in Railway",
    "The backend has been redeployed",
    "Railway logs show no startup errors",
    "Required variables: MONGODB_URI, SESSION_SECRET, NODE_ENV=production, RAILWAY_ENVIRONMENT=production",
];

/// Headers a preflight from the frontend must receive
const CORS_HEADERS: &[&str] = &[
    "access-control-allow-origin",
    "access-control-allow-credentials",
    "access-control-allow-methods",
    "access-control-allow-headers",
];

/// Configuration and CORS verification suite
pub struct RailwayConfigSuite;

impl Suite for RailwayConfigSuite {
    fn name(&self) -> &'static str {
        "config"
    }

    fn description(&self) -> &'static str {
        "Verify Railway configuration and CORS fix"
    }

    fn plan(&self, target: &TargetConfig) -> SuitePlan {
        let origin = target.origin.as_str();

        let preflight = CORS_HEADERS.iter().fold(
            ProbeDescriptor::new("CORS Preflight", Method::Options, "/api/test-cors")
                .describe("OPTIONS request handling")
                .with_header("Origin", origin)
                .with_header("Access-Control-Request-Method", "GET")
                .with_header("Access-Control-Request-Headers", "Content-Type"),
            |probe, header| probe.expect_header(*header),
        );

        let probes = vec![
            ProbeDescriptor::new("Health Check", Method::Get, "/health")
                .describe("Basic backend connectivity")
                .expect_body(BodyCheck::equals("environment.NODE_ENV", "production"))
                .expect_body(BodyCheck::truthy("environment.MONGODB_URI"))
                .expect_body(BodyCheck::truthy("environment.SESSION_SECRET")),
            ProbeDescriptor::new("CORS Test", Method::Get, "/api/test-cors")
                .describe("Cross-origin request handling")
                .with_header("Origin", origin)
                .expect_body(BodyCheck::equals("message", "CORS test successful"))
                .expect_body(BodyCheck::equals("origin", json!(origin))),
            preflight,
        ];

        let success = vec![
            format!("Your frontend at {origin} should now be able to:"),
            "  - Connect to the backend without CORS errors".to_string(),
            "  - Make API calls successfully".to_string(),
            "  - Handle user authentication properly".to_string(),
            "  - Maintain sessions across page refreshes".to_string(),
        ];

        SuitePlan::new(self.name(), self.description(), probes)
            .with_remediation(REMEDIATION)
            .with_success_notes(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::Expectation;

    #[test]
    fn test_suite_metadata() {
        assert_eq!(RailwayConfigSuite.name(), "config");
    }

    #[test]
    fn test_origin_flows_into_checks() {
        let target = TargetConfig {
            origin: "http://localhost:3000".to_string(),
            ..TargetConfig::default()
        };
        let plan = RailwayConfigSuite.plan(&target);

        let cors = &plan.probes[1];
        assert_eq!(
            cors.body_checks[1].expect,
            Expectation::Equals(json!("http://localhost:3000"))
        );
        assert!(plan.success_notes[0].contains("http://localhost:3000"));
    }

    #[test]
    fn test_preflight_expects_all_cors_headers() {
        let plan = RailwayConfigSuite.plan(&TargetConfig::default());
        assert_eq!(plan.probes[2].header_checks, CORS_HEADERS);
    }
}
