//! railcheck test kit
//!
//! Stub HTTP targets for exercising the harness end to end without a real
//! deployment.
//!
//! # Example
//!
//! ```no_run
//! use railcheck_testkit::stub::{StubResponse, StubRoutes, StubServer};
//! use serde_json::json;
//!
//! # async fn example() -> std::io::Result<()> {
//! let routes = StubRoutes::new()
//!     .get("/health", StubResponse::json(json!({"status": "ok"})));
//! let server = StubServer::start(routes).await?;
//!
//! // Point the harness at server.base_url()
//! println!("{}", server.base_url());
//! # Ok(())
//! # }
//! ```

pub mod stub;

pub use stub::{RecordedRequest, StubResponse, StubRoutes, StubServer, unused_local_url};
