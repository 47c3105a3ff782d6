use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devhelper_core::Envelope;
use serde::Serialize;

use crate::error::ToolError;
use crate::tools::{dispatch, tool_definitions};
use crate::types::AppContext;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Dev helper running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Tool catalogue
// ---------------------------------------------------------------------------

pub async fn api_tools() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": tool_definitions() }))
}

// ---------------------------------------------------------------------------
// POST /tools/{name}
// ---------------------------------------------------------------------------

/// Tool invocation endpoint.
///
/// The body is parsed here rather than through axum's `Json` extractor so that
/// malformed input still produces an error envelope. An empty body means `{}`.
pub async fn api_tool_call(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
    body: String,
) -> Response {
    let args = if body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                return ToolError::Validation {
                    message: "Request body is not valid JSON".to_string(),
                    details: Some(serde_json::Value::from(e.to_string())),
                }
                .into_response();
            }
        }
    };

    match dispatch(&ctx, &name, args).await {
        Ok(payload) => (StatusCode::OK, Json(Envelope::json(&payload))).into_response(),
        Err(e) => e.into_response(),
    }
}
