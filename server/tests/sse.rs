//! Integration tests for the `/sse` notification channel.
//!
//! The harness uses a 50 ms heartbeat so ping events arrive quickly. Timing
//! assertions run on a paused clock instead.

mod helpers;

use axum::http::{header, Request, StatusCode};
use axum::body::Body;
use devhelper_core::Envelope;
use helpers::TestHarness;
use http_body_util::BodyExt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

/// Read the next body frame as text, failing the test after `secs` seconds.
async fn next_frame(body: &mut Body, secs: u64) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(secs), body.frame())
        .await
        .expect("timed out waiting for SSE frame")
        .expect("stream ended")
        .expect("frame error");
    let bytes = frame.into_data().expect("data frame");
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Pull the `data:` line out of one SSE event.
fn data_line(event: &str) -> &str {
    event.lines().find_map(|l| l.strip_prefix("data: ")).expect("event has data")
}

#[tokio::test]
async fn test_sse_headers() {
    let h = TestHarness::from_fixture("basic");
    let resp = h.get("/sse").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/event-stream"));
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
}

#[tokio::test]
async fn test_sse_permissive_cors() {
    let h = TestHarness::from_fixture("basic");
    let resp = h
        .send(
            Request::builder()
                .uri("/sse")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_sse_first_event_announces_tools() {
    let h = TestHarness::from_fixture("basic");
    let mut body = h.get("/sse").await.into_body();

    let first = next_frame(&mut body, 2).await;
    assert!(first.contains("event: message"), "first event: {first}");

    let envelope: Envelope = serde_json::from_str(data_line(&first)).unwrap();
    assert!(!envelope.is_error);
    let payload = envelope.payload().unwrap();
    assert_eq!(payload["status"], "connected");
    assert_eq!(payload["name"], "dev-helper");
    let tools = payload["capabilities"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 6);
    assert!(tools.iter().any(|t| t == "run_npm_script"));
}

#[tokio::test]
async fn test_sse_heartbeats_follow() {
    let h = TestHarness::from_fixture("basic");
    let mut body = h.get("/sse").await.into_body();
    let _announcement = next_frame(&mut body, 2).await;

    for expected in 1..=2u64 {
        let ping = next_frame(&mut body, 2).await;
        assert!(ping.contains("event: ping"), "heartbeat event: {ping}");
        let data: serde_json::Value = serde_json::from_str(data_line(&ping)).unwrap();
        assert_eq!(data["type"], "ping");
        assert_eq!(data["sequence"], expected);
        assert!(data["timestamp"].as_str().unwrap().contains('T'));
    }
}

#[tokio::test]
async fn test_sse_disconnect_releases_connection() {
    let h = TestHarness::from_fixture("basic");
    assert_eq!(h.ctx.open_connections(), 0);

    let first = h.get("/sse").await.into_body();
    let mut second = h.get("/sse").await.into_body();
    assert_eq!(h.ctx.open_connections(), 2);

    // Client goes away: axum drops the body, and with it the stream and timer
    drop(first);
    assert_eq!(h.ctx.open_connections(), 1);

    let _ = next_frame(&mut second, 2).await;
    drop(second);
    assert_eq!(h.ctx.open_connections(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sse_heartbeats_follow_configured_interval() {
    let period = Duration::from_secs(25);
    let h = TestHarness::with_config("basic", |c| c.heartbeat = period);
    let just_under = period - Duration::from_millis(1);

    let start = Instant::now();
    let mut body = h.get("/sse").await.into_body();
    let first = next_frame(&mut body, 1).await;
    assert!(first.contains("event: message"));
    assert_eq!(start.elapsed(), Duration::ZERO);

    for expected in 1..=2u32 {
        let early = tokio::time::timeout(just_under, body.frame()).await;
        assert!(early.is_err(), "ping {expected} arrived before a full period");

        let ping = next_frame(&mut body, 1).await;
        let data: serde_json::Value = serde_json::from_str(data_line(&ping)).unwrap();
        assert_eq!(data["sequence"], expected);
        assert!(start.elapsed() >= period * expected);
        assert!(start.elapsed() < period * expected + Duration::from_millis(10));
    }
}

#[tokio::test]
async fn test_sse_stream_ends_on_shutdown() {
    let h = TestHarness::from_fixture("basic");
    let mut body = h.get("/sse").await.into_body();
    let _announcement = next_frame(&mut body, 2).await;

    h.ctx.shutdown.cancel();
    let end = tokio::time::timeout(Duration::from_secs(2), body.frame())
        .await
        .expect("stream should end once shutdown starts");
    assert!(end.is_none());

    drop(body);
    assert_eq!(h.ctx.open_connections(), 0);
}

#[tokio::test]
async fn test_graceful_shutdown_with_open_sse_client() {
    let h = TestHarness::from_fixture("basic");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = h.ctx.shutdown.clone();
    let serve = axum::serve(listener, h.router())
        .with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let server = tokio::spawn(async move { serve.await });

    let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /sse HTTP/1.1\r\nHost: localhost\r\nAccept: text/event-stream\r\n\r\n")
        .await
        .unwrap();

    // Wait until the announcement has reached the client
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !String::from_utf8_lossy(&received).contains("connected") {
        let n = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
            .await
            .expect("timed out waiting for announcement")
            .unwrap();
        assert!(n > 0, "connection closed before the announcement");
        received.extend_from_slice(&buf[..n]);
    }
    assert_eq!(h.ctx.open_connections(), 1);

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .expect("server kept running with an SSE client attached")
        .unwrap();
    assert!(result.is_ok());

    // The client sees the connection close
    let mut rest = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(2), client.read_to_end(&mut rest)).await;
    assert_eq!(h.ctx.open_connections(), 0);
}
