//! Shared test utilities for reqwatch integration tests.
//!
//! Provides payload builders and client constructors pointed at a
//! `wiremock` server so each test file only describes its scenario.

#![allow(dead_code)]

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use reqwatch::api::ApiClient;
use reqwatch::config::ApiConfig;
use reqwatch::model::LogEntry;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Token the mock backend accepts
pub const TEST_TOKEN: &str = "key:client";

/// Timestamp used for every generated entry
pub const TEST_DATE: &str = "2024-01-01T10:00:00.000Z";

// =============================================================================
// Payload Builders
// =============================================================================

/// One log entry in the backend's snake_case wire format.
pub fn entry_json(endpoint: &str, status: u16, res_time: u32) -> Value {
    json!({
        "method": "GET",
        "endpoint": endpoint,
        "params": "",
        "req_headers": "accept: */*",
        "res_headers": "content-type: application/json",
        "date": TEST_DATE,
        "status": status,
        "req_body": null,
        "res_body": null,
        "res_time": res_time,
    })
}

/// A `/requests` page with `count` generated entries.
pub fn page_json(count: usize, total_items: usize) -> Value {
    let requests: Vec<Value> = (0..count)
        .map(|i| entry_json(&format!("/api/items/{}", i), 200, 10 + i as u32))
        .collect();
    json!({ "requests": requests, "totalItems": total_items })
}

/// Parsed entries matching [`entry_json`].
pub fn entries(endpoints: &[&str]) -> Vec<LogEntry> {
    endpoints
        .iter()
        .map(|e| serde_json::from_value(entry_json(e, 200, 5)).unwrap())
        .collect()
}

// =============================================================================
// Client Builders
// =============================================================================

/// API configuration pointed at a mock server.
pub fn api_config(base_url: &str, token: Option<&str>) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        token: token.map(str::to_string),
        timeout_seconds: 2,
        ..Default::default()
    }
}

/// Authenticated client for a mock server.
pub fn api_client(base_url: &str) -> ApiClient {
    ApiClient::new(&api_config(base_url, Some(TEST_TOKEN))).unwrap()
}

// =============================================================================
// Live Stream Server
// =============================================================================

/// Mock `/requests-ws` endpoint.
///
/// Expects the token as the first text frame. A wrong token gets a policy
/// close with reason "Authentication failed"; the right one gets every
/// configured snapshot frame, then the socket stays open until the client
/// closes it.
#[derive(Clone, Default)]
pub struct WsBackend {
    pub frames: Arc<Vec<String>>,
    pub received: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<Mutex<usize>>,
}

impl WsBackend {
    pub fn with_snapshots(snapshots: &[&[&str]]) -> Self {
        let frames = snapshots
            .iter()
            .map(|endpoints| serde_json::to_string(&entries(endpoints)).unwrap())
            .collect();
        Self {
            frames: Arc::new(frames),
            ..Default::default()
        }
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        *self.closes.lock().unwrap()
    }

    /// Serve on an ephemeral port; returns the websocket URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/requests-ws", get(ws_handler))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("ws://{}/requests-ws", addr)
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(backend): State<WsBackend>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, backend))
}

async fn serve_socket(mut socket: WebSocket, backend: WsBackend) {
    let Some(Ok(Message::Text(token))) = socket.recv().await else {
        return;
    };
    backend.received.lock().unwrap().push(token.clone());

    if token != TEST_TOKEN {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 1008,
                reason: "Authentication failed".into(),
            })))
            .await;
        return;
    }

    for frame in backend.frames.iter() {
        if socket.send(Message::Text(frame.clone())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            *backend.closes.lock().unwrap() += 1;
            break;
        }
    }
}
