//! Metric-recording wrappers around the library collaborators.

use std::sync::Arc;

use devcamper_lib::{
    Document, DocumentStore, Fields, Filter, GeoPoint, Geocoder, RecordId, Result, Schema,
    UpdateOptions,
};
use futures::future::{BoxFuture, FutureExt};

use crate::metrics::{record_geocode_lookup, record_store_operation};

fn outcome<T>(result: &Result<T>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Counts every store call in `devcamper_store_operations_total`.
pub struct InstrumentedStore {
    inner: Arc<dyn DocumentStore>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self { inner }
    }

    fn observe<'a, T: Send + 'a>(
        operation: &'static str,
        call: BoxFuture<'a, Result<T>>,
    ) -> BoxFuture<'a, Result<T>> {
        call.map(move |result| {
            record_store_operation(operation, outcome(&result));
            result
        })
        .boxed()
    }
}

impl DocumentStore for InstrumentedStore {
    fn find(&self, schema: &'static Schema, filter: Filter) -> BoxFuture<'_, Result<Vec<Document>>> {
        Self::observe("find", self.inner.find(schema, filter))
    }

    fn find_by_id(&self, schema: &'static Schema, id: RecordId) -> BoxFuture<'_, Result<Option<Document>>> {
        Self::observe("find_by_id", self.inner.find_by_id(schema, id))
    }

    fn create(&self, schema: &'static Schema, fields: Fields) -> BoxFuture<'_, Result<Document>> {
        Self::observe("create", self.inner.create(schema, fields))
    }

    fn find_by_id_and_update(
        &self,
        schema: &'static Schema,
        id: RecordId,
        fields: Fields,
        options: UpdateOptions,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        Self::observe(
            "find_by_id_and_update",
            self.inner.find_by_id_and_update(schema, id, fields, options),
        )
    }

    fn find_by_id_and_delete(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        Self::observe("find_by_id_and_delete", self.inner.find_by_id_and_delete(schema, id))
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        self.inner.ping()
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

/// Counts lookups in `devcamper_geocode_lookups_total` by outcome.
pub struct InstrumentedGeocoder {
    inner: Arc<dyn Geocoder>,
}

impl InstrumentedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>) -> Self {
        Self { inner }
    }
}

impl Geocoder for InstrumentedGeocoder {
    fn geocode<'a>(&'a self, postal_code: &'a str) -> BoxFuture<'a, Result<Vec<GeoPoint>>> {
        self.inner
            .geocode(postal_code)
            .map(|result| {
                record_geocode_lookup(match &result {
                    Ok(points) if points.is_empty() => "unresolved",
                    Ok(_) => "resolved",
                    Err(_) => "error",
                });
                result
            })
            .boxed()
    }
}
