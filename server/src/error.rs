//! Tool error taxonomy and its HTTP rendering.
//!
//! | Variant      | Status | Raised when                                   |
//! |--------------|--------|-----------------------------------------------|
//! | `Validation` | 400    | required input missing or malformed           |
//! | `NotFound`   | 404    | file, document or tool does not exist         |
//! | `Io`         | 500    | filesystem or process failure                 |
//! | `Internal`   | 500    | unexpected failure inside handler logic       |
//!
//! Every variant renders as an error [`Envelope`] whose payload has an `error`
//! message, `details` when a cause is known, and any echoed request fields.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devhelper_core::Envelope;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{message}")]
    Validation { message: String, details: Option<Value> },

    #[error("{message}")]
    NotFound { message: String, echo: Map<String, Value> },

    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {details}")]
    Internal { details: String, echo: Map<String, Value> },
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation { message: message.into(), details: None }
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        ToolError::Io { message: message.into(), source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ToolError::Validation { .. } => StatusCode::BAD_REQUEST,
            ToolError::NotFound { .. } => StatusCode::NOT_FOUND,
            ToolError::Io { .. } | ToolError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON object carried inside the error envelope.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        match self {
            ToolError::Validation { message, details } => {
                body.insert("error".into(), Value::from(message.as_str()));
                if let Some(d) = details {
                    body.insert("details".into(), d.clone());
                }
            }
            ToolError::NotFound { message, echo } => {
                body.insert("error".into(), Value::from(message.as_str()));
                body.extend(echo.clone());
            }
            ToolError::Io { message, source } => {
                body.insert("error".into(), Value::from(message.as_str()));
                body.insert("details".into(), Value::from(source.to_string()));
            }
            ToolError::Internal { details, echo } => {
                body.insert("error".into(), Value::from("Internal server error"));
                body.insert("details".into(), Value::from(details.as_str()));
                body.extend(echo.clone());
            }
        }
        Value::Object(body)
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::error(&self.payload()))).into_response()
    }
}

/// Build a JSON object from `(key, value)` pairs for echoed error fields.
pub fn echo<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
