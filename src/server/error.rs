//! Mapping of relay errors to HTTP responses

use crate::utils::error::{ErrorCategory, RelayError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.category() {
            ErrorCategory::Client | ErrorCategory::Data => {
                tracing::warn!(status = status.as_u16(), category = ?self.category(), "{}", self)
            }
            ErrorCategory::Upstream | ErrorCategory::System => {
                tracing::error!(status = status.as_u16(), category = ?self.category(), "{}", self)
            }
        }

        let body = Json(json!({
            "error": self.label(),
            "details": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
