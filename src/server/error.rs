//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>` and use `?` on anything that
//! yields a [`clipdock_common::Error`].

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use clipdock_common::Error;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self(Error::Io(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        }

        // Range failures follow RFC 9110: no body, just the current length.
        if let Error::RangeNotSatisfiable { size } = self.0 {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
            )
                .into_response();
        }

        let code = match &self.0 {
            Error::NotFound { .. } => "not_found",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::SpawnFailed { .. } => "spawn_failed",
            Error::ProcessFailed { .. } => "process_failed",
            Error::MalformedControlLine(_) => "malformed_control_line",
            Error::Validation(_) => "validation_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.0.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
