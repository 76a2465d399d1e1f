//! Doubles and fixtures for handler tests.
//!
//! Enable the `test-utils` feature to use these from another crate's tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use devcamper_lib::{
    Document, DocumentStore, Fields, Filter, GeoPoint, Geocoder, MemoryStore, RecordId, Result,
    Schema, UpdateOptions,
};
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::json;

use crate::state::AppState;

/// Postal code the default geocoder resolves.
pub const BOSTON_ZIPCODE: &str = "02134";

/// Coordinates [`StaticGeocoder::boston`] returns for [`BOSTON_ZIPCODE`].
pub fn allston() -> GeoPoint {
    GeoPoint::new(42.35236, -71.13203)
}

/// Geocoder answering from a fixed table. Unknown codes resolve to nothing.
#[derive(Debug, Default)]
pub struct StaticGeocoder {
    table: HashMap<String, Vec<GeoPoint>>,
    lookups: Mutex<Vec<String>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boston() -> Self {
        Self::new().with(BOSTON_ZIPCODE, allston())
    }

    pub fn with(mut self, postal_code: &str, point: GeoPoint) -> Self {
        self.table
            .entry(postal_code.to_string())
            .or_default()
            .push(point);
        self
    }

    /// Postal codes looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode<'a>(&'a self, postal_code: &'a str) -> BoxFuture<'a, Result<Vec<GeoPoint>>> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(postal_code.to_string());
        let points = self.table.get(postal_code).cloned().unwrap_or_default();
        future::ready(Ok(points)).boxed()
    }
}

/// In-memory store that remembers every filter passed to `find`.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    filters: Mutex<Vec<Filter>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_filter(&self) -> Option<Filter> {
        self.filters().pop()
    }
}

impl DocumentStore for RecordingStore {
    fn find(&self, schema: &'static Schema, filter: Filter) -> BoxFuture<'_, Result<Vec<Document>>> {
        self.filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(filter.clone());
        self.inner.find(schema, filter)
    }

    fn find_by_id(&self, schema: &'static Schema, id: RecordId) -> BoxFuture<'_, Result<Option<Document>>> {
        self.inner.find_by_id(schema, id)
    }

    fn create(&self, schema: &'static Schema, fields: Fields) -> BoxFuture<'_, Result<Document>> {
        self.inner.create(schema, fields)
    }

    fn find_by_id_and_update(
        &self,
        schema: &'static Schema,
        id: RecordId,
        fields: Fields,
        options: UpdateOptions,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        self.inner.find_by_id_and_update(schema, id, fields, options)
    }

    fn find_by_id_and_delete(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        self.inner.find_by_id_and_delete(schema, id)
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        self.inner.ping()
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

/// Fresh state over an empty in-memory store and [`StaticGeocoder::boston`].
pub fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), Arc::new(StaticGeocoder::boston()))
}

/// State over caller-held doubles so tests can inspect them afterwards.
pub fn test_state_with(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> AppState {
    AppState::new(store, geocoder)
}

/// A valid bootcamp body near Boston University.
pub fn devworks_body() -> serde_json::Value {
    json!({
        "name": "Devworks Bootcamp",
        "description": "Devworks is a full stack JavaScript Bootcamp located in the heart of Boston",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "location": {"type": "Point", "coordinates": [-71.104081, 42.350846]},
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true,
        "jobGuarantee": false,
        "acceptGi": true
    })
}

/// A valid bootcamp body in Lowell, outside a 10 mile radius of Boston.
pub fn modern_tech_body() -> serde_json::Value {
    json!({
        "name": "ModernTech Bootcamp",
        "description": "ModernTech has one goal, and that is to make you a rockstar developer",
        "address": "220 Pawtucket St, Lowell, MA 01854",
        "location": {"type": "Point", "coordinates": [-71.324646, 42.6431]},
        "careers": ["Web Development", "UI/UX", "Mobile Development"],
        "averageCost": 10000,
        "acceptGi": false
    })
}
