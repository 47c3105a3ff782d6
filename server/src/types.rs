use dashmap::DashMap;
use devhelper_core::DocumentSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name announced on the SSE channel.
pub const SERVER_NAME: &str = "dev-helper";

/// Default listen port when neither `--port`, `PORT` nor `.devhelper.toml` sets one.
pub const DEFAULT_PORT: u16 = 3000;

/// Default interval between SSE `ping` events.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(25);

/// Default result limit for the `search` tool.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Package-manager binary invoked by `run_npm_script`.
pub fn default_npm_command() -> String {
    if cfg!(target_os = "windows") { "npm.cmd" } else { "npm" }.to_string()
}

// ---------------------------------------------------------------------------
// Server configuration — passed explicitly, never read from globals by handlers
// ---------------------------------------------------------------------------

/// Runtime configuration. Built from defaults, `.devhelper.toml`, environment and CLI flags.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Base directory every tool path is resolved against.
    pub project_root: PathBuf,
    pub port: u16,
    /// Bind 0.0.0.0 instead of 127.0.0.1.
    pub bind_all: bool,
    /// Interval between SSE heartbeats.
    pub heartbeat: Duration,
    /// Binary spawned by `run_npm_script` (argv, never through a shell).
    pub npm_command: String,
}

impl ServerConfig {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            port: DEFAULT_PORT,
            bind_all: false,
            heartbeat: DEFAULT_HEARTBEAT,
            npm_command: default_npm_command(),
        }
    }

    pub fn bind_addr(&self) -> String {
        let host = if self.bind_all { "0.0.0.0" } else { "127.0.0.1" };
        format!("{host}:{}", self.port)
    }
}

// ---------------------------------------------------------------------------
// SSE connection registry
// ---------------------------------------------------------------------------

/// Bookkeeping for one open `/sse` stream. Lives in [`AppContext::connections`]
/// from connect until the stream is dropped.
#[derive(Clone, Debug)]
pub struct SseSession {
    pub connected_at: Instant,
}

impl SseSession {
    pub fn new() -> Self {
        Self { connected_at: Instant::now() }
    }
}

impl Default for SseSession {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Axum state
// ---------------------------------------------------------------------------

/// Shared, cheaply cloneable state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub documents: Arc<dyn DocumentSource>,
    pub connections: Arc<DashMap<Uuid, SseSession>>,
    /// Cancelled when the server starts shutting down; open SSE streams end on it.
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(config: ServerConfig, documents: Arc<dyn DocumentSource>) -> Self {
        Self {
            config: Arc::new(config),
            documents,
            connections: Arc::new(DashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of currently open SSE streams.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }
}
