//! `GET /sse` — push-only notification channel.
//!
//! On connect the client receives one `message` event announcing the server and
//! its tools, then a `ping` event every heartbeat interval until it disconnects.
//! The interval timer and the registry entry are owned by the stream, so both
//! are released when axum drops the stream on disconnect. Streams also end when
//! [`AppContext::shutdown`] is cancelled, so graceful shutdown does not wait on
//! clients that never hang up.

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use devhelper_core::Envelope;
use std::convert::Infallible;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use futures_util::stream::{Stream, StreamExt};
use tokio_stream::wrappers::IntervalStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::tools::TOOL_NAMES;
use crate::types::{AppContext, SseSession, SERVER_NAME};

/// Registry handle for one open stream. Dropping it unregisters the connection.
pub struct SseConnection {
    id: Uuid,
    ctx: AppContext,
    sequence: u64,
}

impl SseConnection {
    pub fn open(ctx: AppContext) -> Self {
        let id = Uuid::new_v4();
        ctx.connections.insert(id, SseSession::new());
        info!(connection = %id, open = ctx.open_connections(), "SSE client connected");
        Self { id, ctx, sequence: 0 }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Build the next heartbeat event.
    fn heartbeat(&mut self) -> Event {
        self.sequence += 1;
        ping_event(self.sequence)
    }
}

impl Drop for SseConnection {
    fn drop(&mut self) {
        let lifetime = self.ctx.connections.remove(&self.id).map(|(_, s)| s.connected_at.elapsed());
        info!(
            connection = %self.id,
            heartbeats = self.sequence,
            secs = lifetime.map(|d| d.as_secs()).unwrap_or(0),
            "SSE client disconnected"
        );
    }
}

/// First event on every stream: identity and tool list, wrapped in an envelope.
pub fn connected_event() -> Event {
    let announcement = serde_json::json!({
        "status": "connected",
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": { "tools": TOOL_NAMES },
    });
    let event = Event::default().event("message");
    match serde_json::to_string(&Envelope::json(&announcement)) {
        Ok(data) => event.data(data),
        Err(e) => {
            warn!(error = %e, "Failed to serialize SSE announcement");
            event.data(r#"{"content":[]}"#)
        }
    }
}

fn ping_event(sequence: u64) -> Event {
    let data = serde_json::json!({
        "type": "ping",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "sequence": sequence,
    });
    Event::default().event("ping").data(data.to_string())
}

/// Announcement followed by heartbeats. The first heartbeat fires one full
/// period after connect.
pub fn event_stream(ctx: AppContext) -> impl Stream<Item = Result<Event, Infallible>> {
    let period = ctx.config.heartbeat;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = ctx.shutdown.clone().cancelled_owned();
    let mut conn = SseConnection::open(ctx);
    let heartbeats = IntervalStream::new(ticker).map(move |_| Ok(conn.heartbeat()));

    tokio_stream::once(Ok(connected_event())).chain(heartbeats).take_until(shutdown)
}

pub async fn sse_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    (
        [(header::CONNECTION, "keep-alive")],
        Sse::new(event_stream(ctx)),
    )
}
