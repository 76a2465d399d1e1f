//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>`.
    pub status: String,
    pub service: String,
    pub version: String,
    /// Store backend answering readiness pings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            store: None,
        }
    }

    pub fn ready(service: &str, version: &str, store: &str) -> Self {
        Self {
            store: Some(store.to_string()),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, store: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            ..Self::ready(service, version, store)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /health/live`: the process is up.
pub async fn health_live(State(state): State<AppState>) -> impl IntoResponse {
    let status = HealthStatus::alive(state.service_name(), state.service_version());
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: the document store answers a ping.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = state.service_name();
    let version = state.service_version();
    let backend = state.store().backend();

    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::ready(service, version, backend))).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, backend, "readiness check failed");
            let status = HealthStatus::not_ready(service, version, backend, "store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
