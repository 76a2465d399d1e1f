//! DevCamper bootcamp directory service.
//!
//! # Endpoints
//!
//! - `GET /api/v1/bootcamps` - list bootcamps, filtered by query parameters
//! - `POST /api/v1/bootcamps` - create a bootcamp
//! - `GET|PUT|DELETE /api/v1/bootcamps/{id}` - read, patch or remove one
//! - `GET /api/v1/bootcamps/radius/{zipcode}/{distance}` - bootcamps within `distance` miles
//! - `POST /api/v1/auth/register` - create a user account
//! - `GET /health/live`, `GET /health/ready` - probes
//! - `GET /metrics` - Prometheus exposition (path configurable)

#![deny(warnings)]

pub mod auth;
pub mod bootcamps;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use devcamper_service_shared::{
    health_live, health_ready, metrics_handler, AppState, ErrorReport, MetricsConfig, MetricsLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Router with the default metrics path.
pub fn router(state: AppState) -> Router {
    build_router(state, &MetricsConfig::default())
}

pub fn build_router(state: AppState, metrics: &MetricsConfig) -> Router {
    let api = Router::new()
        .route(
            "/bootcamps",
            get(bootcamps::list_bootcamps).post(bootcamps::create_bootcamp),
        )
        .route(
            "/bootcamps/{id}",
            get(bootcamps::get_bootcamp)
                .put(bootcamps::update_bootcamp)
                .delete(bootcamps::delete_bootcamp),
        )
        .route(
            "/bootcamps/radius/{zipcode}/{distance}",
            get(bootcamps::bootcamps_in_radius),
        )
        .route("/auth/register", post(auth::register))
        .method_not_allowed_fallback(method_not_allowed);

    let mut app = Router::new()
        .nest("/api/v1", api)
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));
    if metrics.enabled {
        app = app.route(&metrics.path, get(metrics_handler));
    }

    let state = state.with_service(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    app.method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}

async fn route_not_found() -> ErrorReport {
    ErrorReport::not_found("Route not found")
}

async fn method_not_allowed() -> ErrorReport {
    ErrorReport::new(
        "method_not_allowed",
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
    )
}
