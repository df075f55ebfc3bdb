//! Integration tests for the realtime token broker.
//!
//! Each test serves the full router on an ephemeral port and points the
//! session client at an `httpmock` upstream, so no real OpenAI traffic is
//! made.

use std::net::SocketAddr;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use realtime_token_broker::api::{create_router, AppState};
use realtime_token_broker::config::Config;
use realtime_token_broker::realtime::{SessionClient, SessionFailure, SessionSuccess};

const SERVER_KEY: &str = "sk-integration-server-key";

/// Serve the broker against the given upstream base URL.
async fn spawn_broker(upstream_base: String) -> SocketAddr {
    let mut config = Config::with_api_key(SERVER_KEY);
    config.openai_api_base = upstream_base;
    config.api_title = "integration broker".to_string();
    config.upstream_timeout_ms = 2_000;
    assert_ok!(config.validate());

    let client = SessionClient::new(&config).unwrap();
    let state = AppState::new(config.api_title.as_str(), client);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    addr
}

/// Port with nothing listening on it.
async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_hello_ignores_headers_and_query() {
    let addr = spawn_broker(format!("http://127.0.0.1:{}/v1", refused_port().await)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/?foo=bar", addr))
        .header("x-anything", "value")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "Hello, world! I am integration broker"
    );
}

#[tokio::test]
async fn test_session_success_is_relayed_and_key_stays_private() {
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/realtime/sessions")
                .header("authorization", format!("Bearer {}", SERVER_KEY));
            then.status(200).json_body(json!({
                "client_secret": { "value": "abc", "expires_at": 1700000000 }
            }));
        })
        .await;
    let addr = spawn_broker(upstream.url("/v1")).await;

    let response = reqwest::get(format!("http://{}/session", addr)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let raw = response.text().await.unwrap();
    assert!(!raw.contains(SERVER_KEY), "server key leaked to caller");

    let body: SessionSuccess = serde_json::from_str(&raw).unwrap();
    assert_eq!(body.client_secret.value, "abc");
    assert_eq!(body.client_secret.expires_at, 1_700_000_000);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_upstream_error_becomes_500_with_body_text() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(POST).path("/v1/realtime/sessions");
            then.status(429).body("rate limited");
        })
        .await;
    let addr = spawn_broker(upstream.url("/v1")).await;

    let response = reqwest::get(format!("http://{}/session", addr)).await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "rate limited" }));
}

#[tokio::test]
async fn test_session_connection_refused_becomes_500() {
    let addr = spawn_broker(format!("http://127.0.0.1:{}/v1", refused_port().await)).await;

    let response = reqwest::get(format!("http://{}/session", addr)).await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: SessionFailure = response.json().await.unwrap();
    assert!(!body.message.is_empty());
    assert!(!body.message.contains(SERVER_KEY));
}

#[tokio::test]
async fn test_session_timeout_becomes_500() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(POST).path("/v1/realtime/sessions");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(json!({ "client_secret": { "value": "late", "expires_at": 1 } }));
        })
        .await;
    let addr = spawn_broker(upstream.url("/v1")).await;

    let response = reqwest::get(format!("http://{}/session", addr)).await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
}

/// Upstream that alternates per call: even calls succeed after a delay,
/// odd calls fail immediately.
async fn spawn_alternating_upstream(hits: Arc<AtomicUsize>) -> SocketAddr {
    async fn sessions(State(hits): State<Arc<AtomicUsize>>) -> Response {
        if hits.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Json(json!({ "client_secret": { "value": "ok", "expires_at": 1 } })).into_response()
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response()
        }
    }

    let app = Router::new()
        .route("/v1/realtime/sessions", post(sessions))
        .with_state(hits);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = spawn_alternating_upstream(hits.clone()).await;
    let broker = spawn_broker(format!("http://{}/v1", upstream)).await;
    let http = reqwest::Client::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let http = http.clone();
        handles.push(tokio::spawn(async move {
            let response = http
                .get(format!("http://{}/session", broker))
                .send()
                .await
                .unwrap();
            let status = response.status().as_u16();
            (status, response.json::<Value>().await.unwrap())
        }));
    }

    let mut succeeded = 0;
    let mut failed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            (200, body) => {
                assert_eq!(body["client_secret"]["value"], "ok");
                succeeded += 1;
            }
            (500, body) => {
                assert_eq!(body, json!({ "message": "upstream down" }));
                failed += 1;
            }
            (status, body) => panic!("unexpected response {}: {}", status, body),
        }
    }

    // Failures answered while successes were still in flight on the same
    // broker, and neither outcome leaked into the other.
    assert_eq!(succeeded, 4);
    assert_eq!(failed, 4);
    assert_eq!(hits.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn test_docs_ui_is_served() {
    let addr = spawn_broker(format!("http://127.0.0.1:{}/v1", refused_port().await)).await;

    let response = reqwest::get(format!("http://{}/docs/", addr)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("swagger"));
}

#[test]
fn test_missing_key_exits_before_binding() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let output = Command::new(env!("CARGO_BIN_EXE_realtime-token-broker"))
        .env_clear()
        .env("PORT", port.to_string())
        .current_dir(std::env::temp_dir())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OPENAI_API_KEY environment variable is required"),
        "unexpected stderr: {}",
        stderr
    );

    // Nothing was left holding the port.
    assert!(std::net::TcpListener::bind(("0.0.0.0", port)).is_ok());
}

#[test]
fn test_empty_key_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_realtime-token-broker"))
        .env_clear()
        .env("OPENAI_API_KEY", "")
        .current_dir(std::env::temp_dir())
        .arg("check-config")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
