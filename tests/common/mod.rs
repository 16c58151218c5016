//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use axum::http::uri::Authority;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vhost_proxy::{HttpServer, Rule, RuleSet, Shutdown};

/// Request header that makes the mock origin answer with that status.
pub const MOCK_STATUS: &str = "x-mock-status";
/// Request header that makes the mock origin wait this many milliseconds.
pub const MOCK_DELAY_MS: &str = "x-mock-delay-ms";

/// A mock origin that reports what it received in `x-seen-*` response headers.
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockOrigin {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn authority(&self) -> String {
        self.addr.to_string()
    }
}

/// Start a mock origin on an ephemeral port.
///
/// The body is the request body, or `ok` when the request had none.
pub async fn start_mock_origin() -> MockOrigin {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback(echo).with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockOrigin { addr, hits }
}

async fn echo(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);

    if let Some(ms) = header_str(&headers, MOCK_DELAY_MS).and_then(|v| v.parse().ok()) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    let status = header_str(&headers, MOCK_STATUS)
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    let seen = [
        ("x-seen-method", method.to_string()),
        ("x-seen-uri", uri.to_string()),
        ("x-seen-host", header_str(&headers, "host").unwrap_or("").to_string()),
        (
            "x-seen-forwarded-for",
            header_str(&headers, "x-forwarded-for").unwrap_or("").to_string(),
        ),
    ];

    let body = if body.is_empty() {
        Bytes::from_static(b"ok")
    } else {
        body
    };

    (status, seen, body)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Start an origin that accepts connections and never answers.
pub async fn start_silent_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Start an origin that sends headers and part of the body, then stalls.
pub async fn start_stalling_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nab")
                .await;
            held.push(socket);
        }
    });
    addr
}

/// An address with nothing listening on it.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A rule routing `host` to `origin`.
pub fn rule(host: &str, origin: SocketAddr, methods: impl IntoIterator<Item = Method>) -> Rule {
    let origin = Authority::try_from(origin.to_string().as_str()).unwrap();
    Rule::new(host, origin, methods).unwrap()
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(rules: RuleSet, upstream_timeout: Duration) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(rules, upstream_timeout);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
