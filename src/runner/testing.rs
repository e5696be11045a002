//! In-memory transport for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{CapturedResponse, ProbeRequest, Transport, TransportError};

#[derive(Debug, Clone)]
enum Script {
    Respond(CapturedResponse),
    Fail(TransportError),
    Hang,
}

/// Answers requests by URL path; unscripted paths get a bare 404
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, response: CapturedResponse) -> Self {
        self.scripts.insert(path.to_string(), Script::Respond(response));
        self
    }

    pub fn fail(mut self, path: &str, error: TransportError) -> Self {
        self.scripts.insert(path.to_string(), Script::Fail(error));
        self
    }

    pub fn hang(mut self, path: &str) -> Self {
        self.scripts.insert(path.to_string(), Script::Hang);
        self
    }

    /// `METHOD /path` for every request seen, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ProbeRequest) -> Result<CapturedResponse, TransportError> {
        let path = request.url.path().to_string();
        self.calls.lock().push(format!("{} {path}", request.method));

        match self.scripts.get(&path).cloned() {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Hang) => std::future::pending().await,
            None => Ok(CapturedResponse::new(404)),
        }
    }
}
