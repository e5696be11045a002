//! HTTP client capability
//!
//! The [`Transport`] trait is the single seam between the harness and the
//! network. [`ReqwestTransport`] is the production implementation.

mod transport;
mod types;

pub use transport::{DEFAULT_BODY_LIMIT, ReqwestTransport, Transport, TransportError};
pub use types::*;
