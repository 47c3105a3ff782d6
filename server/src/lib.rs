//! dev-helper — local HTTP tool server for coding agents.
//!
//! Exposes project-file listing, reading and writing, npm script execution, a
//! small document search/fetch pair and an SSE heartbeat channel. Every tool
//! response is wrapped in a content-part [`Envelope`](devhelper_core::Envelope).
//!
//! # Modules
//!
//! - [`api`] — HTTP handlers: health, tool catalogue, tool invocation
//! - [`tools`] — Tool catalogue, argument parsing, dispatch and handlers
//! - [`npm`] — `run_npm_script` allow-list and process runner
//! - [`sse`] — `/sse` notification channel
//! - [`error`] — `ToolError` taxonomy and HTTP rendering
//! - [`types`] — Configuration and shared Axum state

pub mod api;
pub mod error;
pub mod npm;
pub mod sse;
pub mod tools;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use types::*;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the full HTTP surface over the given context.
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(api::api_health))
        .route("/tools", get(api::api_tools))
        .route("/tools/{name}", post(api::api_tool_call))
        .route("/sse", get(sse::sse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

// ---------------------------------------------------------------------------
// .devhelper.toml config loading
// ---------------------------------------------------------------------------

/// Known keys in `.devhelper.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["port", "heartbeat_secs", "npm_command"];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Load server configuration for `project_root`.
///
/// Starts from defaults and applies `.devhelper.toml` from the root when present.
/// A missing file is silent; an unparsable file or unknown keys only warn.
pub fn load_devhelper_config(project_root: &Path) -> ServerConfig {
    let mut config = ServerConfig::new(project_root.to_path_buf());
    let config_path = project_root.join(".devhelper.toml");

    if !config_path.exists() {
        return config;
    }

    debug!("Loading .devhelper.toml");
    let table = match std::fs::read_to_string(&config_path).map(|c| c.parse::<toml::Table>()) {
        Ok(Ok(t)) => t,
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to parse .devhelper.toml");
            return config;
        }
        Err(e) => {
            warn!(error = %e, "Failed to read .devhelper.toml");
            return config;
        }
    };

    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *s,
                "Unknown key in .devhelper.toml — did you mean '{s}'?"
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in .devhelper.toml (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    if let Some(port) = table.get("port").and_then(|v| v.as_integer()) {
        match u16::try_from(port) {
            Ok(p) => config.port = p,
            Err(_) => warn!(port = port, "Ignoring out-of-range port in .devhelper.toml"),
        }
    }

    if let Some(secs) = table.get("heartbeat_secs").and_then(|v| v.as_integer()) {
        if secs > 0 {
            config.heartbeat = Duration::from_secs(secs as u64);
        } else {
            warn!(heartbeat_secs = secs, "heartbeat_secs must be positive — keeping default");
        }
    }

    if let Some(cmd) = table.get("npm_command").and_then(|v| v.as_str()) {
        config.npm_command = cmd.to_string();
    }

    config
}
