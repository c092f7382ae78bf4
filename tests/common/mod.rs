//! Shared harness: a scriptable mock upstream and a proxy wired to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use pokeproxy::config::model::{Config, UpstreamConfig};
use pokeproxy::config::settings_from;
use pokeproxy::proxy::forwarder::Forwarder;
use pokeproxy::server::{self, AppState};

/// How long the mock upstream stalls on any path containing `/slow`.
pub const SLOW_UPSTREAM: Duration = Duration::from_millis(1500);

/// Every path-and-query the mock upstream received, in arrival order.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<String>>>);

impl Recorded {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

async fn upstream_handler(State(recorded): State<Recorded>, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    recorded.0.lock().unwrap().push(target.clone());

    let path = uri.path();
    if path.contains("/slow") {
        tokio::time::sleep(SLOW_UPSTREAM).await;
    }
    if path.contains("missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Not found." })),
        )
            .into_response();
    }
    if path.contains("boom") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(serde_json::json!({ "requested": target })).into_response()
}

/// Start the mock upstream. Its API lives under `/api/v2` like the real one.
pub async fn start_upstream() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .fallback(upstream_handler)
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, recorded)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub async fn start_proxy(
    base_url: &str,
    timeout_ms: u64,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let settings = settings_from(&Config {
        upstream: UpstreamConfig {
            base_url: base_url.into(),
            timeout: timeout_ms,
        },
    })
    .unwrap();

    let state = Arc::new(AppState {
        forwarder: Forwarder::new(server::build_http_client(), &settings),
    });
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

/// Mock upstream plus a proxy pointed at its `/api/v2`.
pub async fn start_pair(
    timeout_ms: u64,
) -> (SocketAddr, Recorded, tokio::sync::oneshot::Sender<()>) {
    let (upstream, recorded) = start_upstream().await;
    let (proxy, shutdown) = start_proxy(&format!("http://{upstream}/api/v2"), timeout_ms).await;
    (proxy, recorded, shutdown)
}

/// Send `GET {target}` over a bare TCP connection and return the status
/// code. HTTP clients normalize dot segments before sending, so requests
/// that must keep `.` or `..` go through here.
pub async fn raw_get_status(addr: SocketAddr, target: &str) -> u16 {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap()
}
