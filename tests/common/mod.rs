//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use copilot_relay::http::{AppState, HttpServer};
use copilot_relay::{RelayConfig, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    body: &'static str,
    delay: Duration,
}

/// Handle on a running mock completions endpoint.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}/chat/completions", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }
}

async fn record_and_reply(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    };

    state.captured.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    tokio::time::sleep(state.delay).await;

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
        .into_response()
}

/// Start a mock upstream that records every request and answers with a
/// fixed status and body after `delay`.
pub async fn start_mock_upstream(status: u16, body: &'static str, delay: Duration) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        captured: captured.clone(),
        status: StatusCode::from_u16(status).unwrap(),
        body,
        delay,
    };
    let app = Router::new().fallback(record_and_reply).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, captured }
}

/// Relay configuration pointing at `upstream_url`, demo chat off.
#[allow(dead_code)]
pub fn relay_config(upstream_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.completions_url = upstream_url.to_string();
    config.upstream.request_timeout_secs = 5;
    config.demo_chat.enabled = false;
    config
}

/// Start the relay with `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    serve(server.router()).await
}

/// Start the relay with a pre-built state.
#[allow(dead_code)]
pub async fn start_relay_with_state(config: &RelayConfig, state: AppState) -> (SocketAddr, Shutdown) {
    serve(HttpServer::build_router(config, state)).await
}

async fn serve(router: Router) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await;
    });

    (addr, shutdown)
}

/// Client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
