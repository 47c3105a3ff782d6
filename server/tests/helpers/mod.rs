//! Test harness for tool endpoint integration tests.
//!
//! Copies a fixture project into a temp dir, builds the router over it, and
//! drives requests through `tower::ServiceExt::oneshot` (no socket, no subprocess
//! unless a test runs a script).

pub mod fixtures;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use devhelper_core::{Envelope, StaticDocuments};
use devhelper_server::build_router;
use devhelper_server::types::{AppContext, ServerConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestHarness {
    pub ctx: AppContext,
    _temp_dir: TempDir,
}

/// Parsed tool response: HTTP status, raw envelope and its decoded payload.
pub struct ToolResponse {
    pub status: StatusCode,
    pub envelope: Envelope,
    pub payload: Value,
}

impl TestHarness {
    /// Create a harness from a named fixture directory with default settings.
    pub fn from_fixture(name: &str) -> Self {
        Self::with_config(name, |_| {})
    }

    /// Create a harness from a fixture, letting the test adjust the config.
    pub fn with_config(name: &str, tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let fixture_src =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
        assert!(fixture_src.exists(), "Fixture '{name}' not found at {}", fixture_src.display());

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fixtures::copy_dir_recursive(&fixture_src, temp_dir.path());

        let mut config = ServerConfig::new(temp_dir.path().to_path_buf());
        config.heartbeat = Duration::from_millis(50);
        tweak(&mut config);

        let ctx = AppContext::new(config, Arc::new(StaticDocuments::builtin()));
        TestHarness { ctx, _temp_dir: temp_dir }
    }

    pub fn root(&self) -> &Path {
        &self.ctx.config.project_root
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone())
    }

    /// Send a raw request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    /// POST a raw body to `/tools/<tool>`.
    pub async fn post_raw(&self, tool: &str, body: impl Into<Body>) -> ToolResponse {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/tools/{tool}"))
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        let envelope: Envelope = serde_json::from_value(json_body(response).await)
            .expect("tool responses are envelopes");
        assert_eq!(envelope.content.len(), 1, "exactly one content part");
        let payload = envelope.payload().expect("text part holds a JSON object");
        assert!(payload.is_object(), "payload must be an object: {payload}");
        ToolResponse { status, envelope, payload }
    }

    /// Call a tool with JSON arguments.
    pub async fn call_tool(&self, tool: &str, args: Value) -> ToolResponse {
        self.post_raw(tool, serde_json::to_vec(&args).unwrap()).await
    }
}

/// Helper to parse a JSON response body.
pub async fn json_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
