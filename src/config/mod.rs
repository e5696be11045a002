//! Configuration parsing
//!
//! The harness runs with no configuration at all: the built-in suites target
//! the production deployment. A YAML file can retarget them and declare
//! additional suites.
//!
//! ## Configuration Format
//!
//! ```yaml
//! target:
//!   base_url: https://easyearn-backend-production-01ac.up.railway.app
//!   origin: https://kingeasyearn.com
//!   timeout: 10s
//!   headers:
//!     X-Deploy-Check: ci
//!
//! default_suite: config
//!
//! suites:
//!   smoke:
//!     description: Minimal reachability check
//!     probes:
//!       - name: Health Check
//!         method: GET
//!         path: /health
//!         body_checks:
//!           - field: environment.NODE_ENV
//!             expect:
//!               kind: equals
//!               value: production
//!         header_checks:
//!           - access-control-allow-origin
//! ```

mod overrides;
mod target;

pub use crate::runner::DEFAULT_TIMEOUT;
pub use overrides::{TargetOverrides, parse_header, parse_timeout};
pub use target::{Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_ORIGIN, SuiteConfig, TargetConfig};
