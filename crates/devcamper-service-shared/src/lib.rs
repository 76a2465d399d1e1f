//! Shared HTTP infrastructure for the DevCamper API.
//!
//! - [`AppState`]: the injected document store and geocoder
//! - [`Envelope`] and [`ErrorReport`]: the success and failure bodies
//! - [`health`]: liveness and readiness probes
//! - [`metrics`], [`logging`] and [`middleware`]: observability
//! - [`config`]: environment configuration
//!
//! Handlers stay thin: parse the request, call one
//! [`ResourceController`](devcamper_lib::ResourceController) operation, wrap
//! the result.
//!
//! ```text
//! request ─▶ handler ─▶ ResourceController ─▶ DocumentStore
//!               │                     └──────▶ Geocoder (radius only)
//!               └─▶ Envelope | ErrorReport
//! ```
//!
//! Enable the `test-utils` feature for the [`test_utils`] doubles.

#![deny(warnings)]

pub mod config;
mod health;
mod instrument;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod report;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, GeocoderConfig, ServiceConfig, StoreLocation};
pub use health::{health_live, health_ready, HealthStatus};
pub use instrument::{InstrumentedGeocoder, InstrumentedStore};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_error, record_geocode_lookup, record_records_returned,
    record_store_operation, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use report::{from_lib_error, ErrorReport, SERVER_ERROR_MESSAGE};
pub use request::{list_filter, parse_record_id, RadiusParams, Validate};
pub use response::Envelope;
pub use state::{AppState, AppStateError};
