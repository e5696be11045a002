//! Stub HTTP server
//!
//! Serves canned responses keyed by method and path, and records every
//! request it sees so tests can assert on what the harness actually sent.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
enum StubBody {
    Empty,
    Json(Value),
    Text(String),
}

/// A canned response
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: StubBody,
    delay: Option<Duration>,
}

impl StubResponse {
    /// Empty body with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: StubBody::Empty,
            delay: None,
        }
    }

    /// 200 with a JSON body
    pub fn json(value: Value) -> Self {
        Self {
            body: StubBody::Json(value),
            ..Self::status(200)
        }
    }

    /// 200 with a plain text body
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            body: StubBody::Text(text.into()),
            ..Self::status(200)
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Hold the response back, e.g. to trip a client timeout
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn into_http(self) -> Response {
        let mut response = match self.body {
            StubBody::Empty => Body::empty().into_response(),
            StubBody::Json(value) => Json(value).into_response(),
            StubBody::Text(text) => text.into_response(),
        };
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid stub header"),
            }
        }
        response
    }
}

/// Route table for a stub server
#[derive(Debug, Clone, Default)]
pub struct StubRoutes {
    routes: HashMap<(String, String), StubResponse>,
}

impl StubRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &str, path: &str, response: StubResponse) -> Self {
        self.routes
            .insert((method.to_ascii_uppercase(), path.to_string()), response);
        self
    }

    pub fn get(self, path: &str, response: StubResponse) -> Self {
        self.route("GET", path, response)
    }

    pub fn post(self, path: &str, response: StubResponse) -> Self {
        self.route("POST", path, response)
    }

    pub fn options(self, path: &str, response: StubResponse) -> Self {
        self.route("OPTIONS", path, response)
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<StubResponse> {
        self.routes
            .get(&(method.as_str().to_string(), path.to_string()))
            .cloned()
    }
}

/// A request as the stub saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercase
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct StubState {
    routes: Arc<StubRoutes>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl StubState {
    fn new(routes: StubRoutes) -> Self {
        Self {
            routes: Arc::new(routes),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

fn create_router(state: StubState) -> Router {
    Router::new()
        .fallback(stub_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unknown routes get a bare 404
async fn stub_handler(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
    };
    state.requests.write().await.push(recorded);

    match state.routes.lookup(&method, uri.path()) {
        Some(stub) => {
            if let Some(delay) = stub.delay {
                tokio::time::sleep(delay).await;
            }
            stub.into_http()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A stub server bound to an ephemeral local port
///
/// The server task is aborted when this handle is dropped.
pub struct StubServer {
    addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(routes: StubRoutes) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let state = StubState::new(routes);
        let app = create_router(state.clone());

        tracing::debug!(%addr, "Starting stub server");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "Stub server stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, in arrival order
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().await.clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A local URL with nothing listening on it
///
/// Binds an ephemeral port and releases it straight away, so a connection
/// attempt is refused.
pub async fn unused_local_url() -> io::Result<String> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_route() {
        let state = StubState::new(
            StubRoutes::new().get("/health", StubResponse::json(json!({"status": "ok"}))),
        );
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            HeaderValue::from_static("application/json")
        );
        assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_router(StubState::new(StubRoutes::new()));

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_method_is_part_of_the_key() {
        let routes = StubRoutes::new().options(
            "/api/auth/login",
            StubResponse::status(204).with_header("Access-Control-Allow-Origin", "*"),
        );
        let app = create_router(StubState::new(routes));

        let preflight = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/auth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            preflight.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );

        let get = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let state = StubState::new(StubRoutes::new());
        let app = create_router(state.clone());

        app.oneshot(
            Request::builder()
                .uri("/api/test-cors")
                .header("Origin", "https://frontend.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

        let requests = state.requests.read().await.clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/test-cors");
        assert_eq!(requests[0].header("ORIGIN"), Some("https://frontend.test"));
    }

    #[tokio::test]
    async fn test_text_with_status() {
        let app = create_router(StubState::new(
            StubRoutes::new().get("/", StubResponse::text("Bad Gateway").with_status(502)),
        ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_string(response).await, "Bad Gateway");
    }
}
