//! Shared error taxonomy for the HTTP control plane and the WebSocket
//! dispatcher. Both surfaces classify failures the same way and derive
//! their status code / wire frame from a single enum instead of
//! duplicating classification logic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;

impl GameError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Transient(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders this error as the `{event_type: "error", data: <msg>}` frame
    /// documented in the external interfaces for WebSocket error delivery.
    #[must_use]
    pub fn to_ws_error_frame(&self) -> serde_json::Value {
        json!({
            "event_type": "error",
            "data": { "message": self.to_string() },
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Transient(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}
