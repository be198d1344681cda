//! Test servers bound to ephemeral localhost ports.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use imagegen::state::AppState;
use imagegen::storage::database::Database;
use imagegen_core::config::ServiceConfig;

/// Backend running on an in-memory store. Stops when dropped.
pub struct TestBackend {
    pub addr: SocketAddr,
    shutdown: CancellationToken,
}

impl TestBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::with_store(Database::new_in_memory().unwrap());
        let shutdown = CancellationToken::new();

        tokio::spawn(imagegen::serve(listener, state, shutdown.clone()));
        Self { addr, shutdown }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Clone)]
struct FakeImagesState {
    status: StatusCode,
    body: Value,
    requests: Arc<std::sync::Mutex<Vec<(Option<String>, Value)>>>,
    calls: Arc<AtomicUsize>,
}

/// Fake images API answering every request with a fixed status and body
pub struct FakeImagesApi {
    pub addr: SocketAddr,
    state: FakeImagesState,
}

impl FakeImagesApi {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let state = FakeImagesState {
            status,
            body,
            requests: Arc::new(std::sync::Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let app = Router::new()
            .route("/v1/images/generations", post(fake_generate))
            .route("/files/{name}", get(fake_file))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/images/generations", self.addr)
    }

    /// URL of a downloadable fake image file
    pub fn file_url(&self, name: &str) -> String {
        format!("http://{}/files/{}", self.addr, name)
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Authorization header and JSON body of every request received
    pub fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn fake_generate(
    State(state): State<FakeImagesState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push((auth, body));
    (state.status, Json(state.body.clone()))
}

/// Bytes served for every fake image file
pub const FAKE_IMAGE_BYTES: &[u8] = b"\x89PNG fake image";

async fn fake_file() -> &'static [u8] {
    FAKE_IMAGE_BYTES
}

/// Service config pointing at the given fakes
pub fn service_config(endpoint: &str, backend: &str) -> ServiceConfig {
    ServiceConfig {
        service_endpoint: endpoint.to_string(),
        credential: Some("sk-test".to_string()),
        server_base_url: backend.to_string(),
    }
}
