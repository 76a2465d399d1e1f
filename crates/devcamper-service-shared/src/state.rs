//! Application state shared by every handler.
//!
//! The store and geocoder are injected here once at startup; handlers reach
//! them only through [`AppState`], never through globals.

use std::sync::Arc;

use devcamper_lib::{
    schema, DocumentStore, Error as LibError, Geocoder, MapQuestGeocoder, MemoryStore,
    ResourceController, SqliteStore,
};
use thiserror::Error;

use crate::config::{ServiceConfig, StoreLocation};
use crate::instrument::{InstrumentedGeocoder, InstrumentedStore};
use crate::logging::DEFAULT_SERVICE_NAME;

#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("failed to open document store: {0}")]
    Store(#[source] LibError),

    #[error("failed to build geocoder client: {0}")]
    Geocoder(#[source] LibError),
}

/// Cheaply cloneable handle to the injected collaborators.
///
/// ```ignore
/// use axum::{extract::State, routing::get, Router};
/// use devcamper_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let bootcamps = state.bootcamps();
/// }
///
/// let app = Router::new().route("/", get(handler)).with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
    service: &'static str,
    version: &'static str,
}

impl AppState {
    /// Wrap the collaborators with metric recording and share them.
    pub fn new(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Arc::new(InstrumentedStore::new(store)),
                geocoder: Arc::new(InstrumentedGeocoder::new(geocoder)),
                service: DEFAULT_SERVICE_NAME,
                version: env!("CARGO_PKG_VERSION"),
            }),
        }
    }

    /// Name and version reported by the health probes.
    pub fn with_service(self, service: &'static str, version: &'static str) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Arc::clone(&self.inner.store),
                geocoder: Arc::clone(&self.inner.geocoder),
                service,
                version,
            }),
        }
    }

    pub fn service_name(&self) -> &'static str {
        self.inner.service
    }

    pub fn service_version(&self) -> &'static str {
        self.inner.version
    }

    /// Open the configured store and build the MapQuest client.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let store: Arc<dyn DocumentStore> = match &config.store {
            StoreLocation::Memory => {
                tracing::warn!("using in-memory store; records are lost on exit");
                Arc::new(MemoryStore::new())
            }
            StoreLocation::Sqlite(path) => {
                Arc::new(SqliteStore::open(path).map_err(AppStateError::Store)?)
            }
        };

        if config.geocoder.api_key.is_empty() {
            tracing::warn!("GEOCODER_API_KEY is not set; radius searches will fail upstream");
        }
        let geocoder = MapQuestGeocoder::new(
            config.geocoder.api_key.clone(),
            config.geocoder.base_url.clone(),
            config.geocoder.timeout,
        )
        .map_err(AppStateError::Geocoder)?;

        tracing::info!(backend = store.backend(), "application state ready");
        Ok(Self::new(store, Arc::new(geocoder)))
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.inner.geocoder.as_ref()
    }

    pub fn bootcamps(&self) -> ResourceController {
        ResourceController::new(Arc::clone(&self.inner.store), schema::bootcamps())
    }

    pub fn users(&self) -> ResourceController {
        ResourceController::new(Arc::clone(&self.inner.store), schema::users())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.inner.service)
            .field("backend", &self.inner.store.backend())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeocoderConfig, ServiceConfig};

    #[test]
    fn memory_config_builds_state() {
        let config = ServiceConfig {
            store: StoreLocation::Memory,
            geocoder: GeocoderConfig::default(),
            ..ServiceConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.store().backend(), "memory");
        assert_eq!(state.bootcamps().schema().collection(), "bootcamps");
        assert_eq!(state.users().schema().collection(), "users");
    }

    #[test]
    fn service_identity_defaults_and_overrides() {
        let state = crate::test_utils::test_state();
        assert_eq!(state.service_name(), DEFAULT_SERVICE_NAME);

        let renamed = state.clone().with_service("devcamper-service-api", "9.9.9");
        assert_eq!(renamed.service_name(), "devcamper-service-api");
        assert_eq!(renamed.service_version(), "9.9.9");
        assert_eq!(renamed.store().backend(), state.store().backend());
    }

    #[test]
    fn unopenable_database_is_a_store_error() {
        let config = ServiceConfig {
            store: StoreLocation::Sqlite("/nonexistent-dir/devcamper.db".into()),
            ..ServiceConfig::default()
        };
        let err = AppState::from_config(&config).unwrap_err();
        assert!(matches!(err, AppStateError::Store(_)));
    }
}
