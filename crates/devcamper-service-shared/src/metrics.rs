//! Prometheus metrics.
//!
//! [`init_metrics`] installs the global recorder once at startup and
//! [`metrics_handler`] renders it for the `/metrics` route. The `record_*`
//! helpers wrap the business counters so call sites never spell metric names.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use devcamper_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default()).expect("metrics recorder");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route that serves the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` and `METRICS_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = lookup("METRICS_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());
        Self { enabled, path }
    }
}

#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

/// Install the Prometheus recorder.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render the Prometheus exposition text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Count a document store call by operation and outcome (`ok` / `error`).
pub fn record_store_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "devcamper_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record how many records a list or radius search returned.
pub fn record_records_returned(count: usize, operation: &'static str) {
    metrics::histogram!("devcamper_records_returned", "operation" => operation)
        .record(count as f64);
}

/// Count a geocoder lookup. `outcome` is `resolved`, `unresolved` or `error`.
pub fn record_geocode_lookup(outcome: &'static str) {
    metrics::counter!("devcamper_geocode_lookups_total", "outcome" => outcome).increment(1);
}

/// Count an error response by its kind label.
pub fn record_error(kind: &'static str) {
    metrics::counter!("devcamper_errors_total", "kind" => kind).increment(1);
}
