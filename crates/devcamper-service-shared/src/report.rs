//! The single error reporter for HTTP handlers.
//!
//! Handlers return `Result<_, ErrorReport>` and forward every failure with
//! `?`. [`ErrorReport`] picks the status, logs the failure and renders the
//! failure envelope `{"success": false, "error": "<message>"}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use devcamper_lib::{Error as LibError, ErrorKind};

use crate::metrics::record_error;

/// Message returned to clients for any unexpected failure.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// A failure ready to be written as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Metric and log label, e.g. `not_found`.
    pub kind: &'static str,
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
    /// Internal detail that is logged but never sent.
    pub detail: Option<String>,
}

impl ErrorReport {
    pub fn new(kind: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(kind, StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("forbidden", StatusCode::FORBIDDEN, message)
    }

    /// A 500 whose `detail` only reaches the logs.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new("unexpected", StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
        }
    }
}

/// Map a library error onto its status and client message.
pub fn from_lib_error(err: &LibError) -> ErrorReport {
    match err {
        LibError::NotFound { .. } => ErrorReport::not_found(err.to_string()),
        LibError::Validation { .. } => ErrorReport::bad_request("validation", err.to_string()),
        LibError::MalformedId { .. } => ErrorReport::bad_request("malformed_id", err.to_string()),
        LibError::DuplicateKey { .. } => ErrorReport::bad_request("duplicate_key", err.to_string()),
        LibError::InvalidParameter { .. } => {
            ErrorReport::bad_request("invalid_parameter", err.to_string())
        }
        LibError::UpstreamLookupFailure { .. } => ErrorReport::new(
            ErrorKind::UpstreamLookupFailure.as_str(),
            StatusCode::NOT_FOUND,
            err.to_string(),
        ),
        other => ErrorReport::internal(other.to_string()),
    }
}

impl From<LibError> for ErrorReport {
    fn from(err: LibError) -> Self {
        from_lib_error(&err)
    }
}

impl From<JsonRejection> for ErrorReport {
    fn from(rejection: JsonRejection) -> Self {
        ErrorReport::bad_request("malformed_body", rejection.body_text())
    }
}

impl From<PathRejection> for ErrorReport {
    fn from(rejection: PathRejection) -> Self {
        ErrorReport::bad_request("invalid_parameter", rejection.body_text())
    }
}

impl From<QueryRejection> for ErrorReport {
    fn from(rejection: QueryRejection) -> Self {
        ErrorReport::bad_request("invalid_parameter", rejection.body_text())
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ErrorReport {}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                kind = self.kind,
                status = self.status.as_u16(),
                detail = self.detail.as_deref().unwrap_or(""),
                "request failed"
            );
        } else {
            tracing::warn!(
                kind = self.kind,
                status = self.status.as_u16(),
                message = %self.message,
                "request rejected"
            );
        }
        record_error(self.kind);

        let body = json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
