use std::net::SocketAddr;

use tracing::{error, info};

use devcamper_service_api::build_router;
use devcamper_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsError, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env());

    let config = ServiceConfig::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    match init_metrics(&config.metrics) {
        Ok(()) | Err(MetricsError::Disabled) => {}
        Err(e) => tracing::warn!(error = %e, "continuing without metrics"),
    }

    info!(port = config.port, store = ?config.store, "starting devcamper service");
    let state = AppState::from_config(&config)
        .inspect_err(|e| error!(error = %e, "failed to build application state"))?;

    let app = build_router(state, &config.metrics);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
