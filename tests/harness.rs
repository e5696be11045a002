//! End-to-end runs over real HTTP against a local stub server

use railcheck::client::{FailureKind, ReqwestTransport, ResponseBody};
use railcheck::config::TargetConfig;
use railcheck::probes::{BodyCheck, Method, ProbeDescriptor, Suite, registry::get_suite};
use railcheck::runner::{ProbeOutcome, RunSettings, VerificationRunner};
use railcheck_testkit::{StubResponse, StubRoutes, StubServer, unused_local_url};
use serde_json::json;
use std::time::Duration;

const ORIGIN: &str = "https://frontend.test";

fn runner(base_url: &str) -> VerificationRunner<ReqwestTransport> {
    let settings = RunSettings::new(base_url)
        .unwrap()
        .with_timeout(Duration::from_millis(500))
        .unwrap();
    VerificationRunner::new(ReqwestTransport::new().unwrap(), settings)
}

fn target(base_url: &str) -> TargetConfig {
    TargetConfig {
        base_url: base_url.to_string(),
        origin: ORIGIN.to_string(),
        ..TargetConfig::default()
    }
}

fn healthy_backend() -> StubRoutes {
    StubRoutes::new()
        .get(
            "/health",
            StubResponse::json(json!({
                "status": "ok",
                "environment": {
                    "NODE_ENV": "production",
                    "MONGODB_URI": "mongodb+srv://cluster",
                    "SESSION_SECRET": "s3cret"
                }
            })),
        )
        .get(
            "/api/test-cors",
            StubResponse::json(json!({"message": "CORS test successful", "origin": ORIGIN})),
        )
        .options(
            "/api/test-cors",
            StubResponse::status(204)
                .with_header("Access-Control-Allow-Origin", ORIGIN)
                .with_header("Access-Control-Allow-Credentials", "true")
                .with_header("Access-Control-Allow-Methods", "GET,POST,OPTIONS")
                .with_header("Access-Control-Allow-Headers", "Content-Type"),
        )
}

#[tokio::test]
async fn test_health_probe_passes_over_http() {
    let server = StubServer::start(healthy_backend()).await.unwrap();
    let probe = ProbeDescriptor::new("Health Check", Method::Get, "/health")
        .expect_body(BodyCheck::equals("environment.NODE_ENV", "production"))
        .expect_body(BodyCheck::present("environment.MONGODB_URI"));

    let report = runner(&server.base_url()).run(&[probe]).await.unwrap();

    assert!(report.all_passed);
    assert_eq!(report.exit_code(), 0);
    let response = report.results[0].outcome.response().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(report.results[0].checks.len(), 2);
}

#[tokio::test]
async fn test_config_suite_passes_against_healthy_backend() {
    let server = StubServer::start(healthy_backend()).await.unwrap();
    let plan = get_suite("config").unwrap().plan(&target(&server.base_url()));

    let report = runner(&server.base_url()).run(&plan.probes).await.unwrap();

    for result in &report.results {
        assert!(result.passed, "{} failed: {:?}", result.name(), result.checks);
    }
    assert!(report.all_passed);
}

#[tokio::test]
async fn test_preflight_header_names_are_case_insensitive() {
    // The stub sends mixed-case names; the probe declares lowercase ones
    let server = StubServer::start(healthy_backend()).await.unwrap();
    let probe = ProbeDescriptor::new("CORS Preflight", Method::Options, "/api/test-cors")
        .with_header("Origin", ORIGIN)
        .expect_header("access-control-allow-origin")
        .expect_header("ACCESS-CONTROL-ALLOW-METHODS");

    let report = runner(&server.base_url()).run(&[probe]).await.unwrap();

    assert!(report.all_passed);
    let requests = server.requests().await;
    assert_eq!(requests[0].method, "OPTIONS");
    assert_eq!(requests[0].header("origin"), Some(ORIGIN));
}

#[tokio::test]
async fn test_missing_preflight_header_fails() {
    let routes = StubRoutes::new().options(
        "/api/test-cors",
        StubResponse::status(204).with_header("Access-Control-Allow-Origin", ORIGIN),
    );
    let server = StubServer::start(routes).await.unwrap();
    let probe = ProbeDescriptor::new("CORS Preflight", Method::Options, "/api/test-cors")
        .expect_header("access-control-allow-origin")
        .expect_header("access-control-allow-credentials");

    let report = runner(&server.base_url()).run(&[probe]).await.unwrap();

    assert!(!report.all_passed);
    let checks: Vec<_> = report.results[0].checks.iter().map(|c| c.passed).collect();
    assert_eq!(checks, vec![true, false]);
}

#[tokio::test]
async fn test_connection_refused_is_classified() {
    let base_url = unused_local_url().await.unwrap();
    let probes = [
        ProbeDescriptor::new("Health Check", Method::Get, "/health")
            .expect_body(BodyCheck::present("status")),
        ProbeDescriptor::new("Root Endpoint", Method::Get, "/"),
    ];

    let report = runner(&base_url).run(&probes).await.unwrap();

    assert!(!report.all_passed);
    assert_ne!(report.exit_code(), 0);
    // Every probe is still attempted
    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert!(result.checks.is_empty());
        match &result.outcome {
            ProbeOutcome::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::ConnectionRefused)
            }
            other => panic!("expected connection refused, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let routes = StubRoutes::new().get(
        "/health",
        StubResponse::json(json!({"status": "ok"})).with_delay(Duration::from_secs(5)),
    );
    let server = StubServer::start(routes).await.unwrap();
    let settings = RunSettings::new(&server.base_url())
        .unwrap()
        .with_timeout(Duration::from_millis(100))
        .unwrap();
    let runner = VerificationRunner::new(ReqwestTransport::new().unwrap(), settings);

    let report = runner
        .run(&[ProbeDescriptor::new("Health Check", Method::Get, "/health")])
        .await
        .unwrap();

    let result = &report.results[0];
    assert!(!result.passed);
    assert!(result.checks.is_empty());
    assert!(matches!(
        &result.outcome,
        ProbeOutcome::Failure(f) if f.kind == FailureKind::Timeout
    ));
}

#[tokio::test]
async fn test_middle_failure_does_not_stop_the_run() {
    let routes = StubRoutes::new()
        .get("/one", StubResponse::json(json!({"ok": true})))
        .get("/two", StubResponse::json(json!({"ok": false})))
        .get("/three", StubResponse::json(json!({"ok": true})));
    let server = StubServer::start(routes).await.unwrap();
    let probes: Vec<_> = ["one", "two", "three"]
        .iter()
        .map(|name| {
            ProbeDescriptor::new(*name, Method::Get, format!("/{name}"))
                .expect_body(BodyCheck::truthy("ok"))
        })
        .collect();

    let report = runner(&server.base_url()).run(&probes).await.unwrap();

    let passed: Vec<_> = report.results.iter().map(|r| r.passed).collect();
    assert_eq!(passed, vec![true, false, true]);
    assert!(!report.all_passed);

    let paths: Vec<_> = server.requests().await.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/one", "/two", "/three"]);
}

#[tokio::test]
async fn test_non_json_and_error_status_are_structurally_valid() {
    let routes = StubRoutes::new().get("/", StubResponse::text("Bad Gateway").with_status(502));
    let server = StubServer::start(routes).await.unwrap();

    let report = runner(&server.base_url())
        .run(&[ProbeDescriptor::new("Root Endpoint", Method::Get, "/")])
        .await
        .unwrap();

    assert!(report.all_passed);
    assert_eq!(report.results[0].outcome.response().unwrap().status, 502);
}

#[tokio::test]
async fn test_forwarded_headers_reach_the_target() {
    let server = StubServer::start(healthy_backend()).await.unwrap();
    let settings = RunSettings::new(&server.base_url())
        .unwrap()
        .with_forwarded_header("X-Deploy-Token", "abc")
        .unwrap()
        .with_forwarded_header("Origin", "https://ignored.test")
        .unwrap();
    let runner = VerificationRunner::new(ReqwestTransport::new().unwrap(), settings);
    let probes = [
        ProbeDescriptor::new("Health Check", Method::Get, "/health"),
        ProbeDescriptor::new("CORS Test", Method::Get, "/api/test-cors").with_header("origin", ORIGIN),
    ];

    runner.run(&probes).await.unwrap();

    let requests = server.requests().await;
    assert_eq!(requests[0].header("x-deploy-token"), Some("abc"));
    assert_eq!(requests[0].header("origin"), Some("https://ignored.test"));
    // A probe header overrides a forwarded one with the same name
    assert_eq!(requests[1].header("origin"), Some(ORIGIN));
    assert_eq!(requests[1].header("x-deploy-token"), Some("abc"));
}

#[tokio::test]
async fn test_oversized_body_is_truncated() {
    let message = "x".repeat(64);
    let routes = StubRoutes::new().get("/health", StubResponse::json(json!({"message": message})));
    let server = StubServer::start(routes).await.unwrap();
    let settings = RunSettings::new(&server.base_url()).unwrap();
    let transport = ReqwestTransport::new().unwrap().with_body_limit(16);
    let runner = VerificationRunner::new(transport, settings);

    let probe = ProbeDescriptor::new("Health Check", Method::Get, "/health")
        .expect_body(BodyCheck::present("message"));
    let report = runner.run(&[probe]).await.unwrap();

    let response = report.results[0].outcome.response().unwrap();
    match &response.body {
        ResponseBody::Text(text) => assert_eq!(text, r#"{"message":"xxxx"#),
        other => panic!("expected truncated text, got {other:?}"),
    }
    // A cut-off body cannot satisfy JSON checks
    assert!(!report.all_passed);
}

#[tokio::test]
async fn test_body_at_limit_is_decoded() {
    let routes = StubRoutes::new().get("/health", StubResponse::json(json!({"ok": true})));
    let server = StubServer::start(routes).await.unwrap();
    let settings = RunSettings::new(&server.base_url()).unwrap();
    // {"ok":true} is exactly 11 bytes
    let transport = ReqwestTransport::new().unwrap().with_body_limit(11);
    let runner = VerificationRunner::new(transport, settings);

    let report = runner
        .run(&[ProbeDescriptor::new("Health Check", Method::Get, "/health")
            .expect_body(BodyCheck::truthy("ok"))])
        .await
        .unwrap();
    assert!(report.all_passed);
}
