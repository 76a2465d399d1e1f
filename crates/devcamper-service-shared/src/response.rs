//! Success envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// `{"success": true, "count"?: n, "data": payload}`.
///
/// ```
/// use devcamper_service_shared::Envelope;
///
/// let listed = Envelope::list(vec!["a", "b"]);
/// assert_eq!(listed.count, Some(2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> Envelope<T> {
    /// A 200 response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data,
            status: StatusCode::OK,
        }
    }

    /// A 201 response for a freshly created record.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T> Envelope<Vec<T>> {
    /// A 200 response for a sequence, including its length.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::ok(items)
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
