//! Transport-agnostic resource controller.
//!
//! A [`ResourceController`] binds one collection [`Schema`] to an injected
//! [`DocumentStore`]. Each operation translates its inputs into exactly one
//! store call (radius search makes one geocoder call first) and turns an
//! absent record into a typed [`Error::NotFound`]. Controllers hold no mutable
//! state and are cheap to clone.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::geocoder::Geocoder;
use crate::query::Filter;
use crate::record::{Document, Fields, RecordId};
use crate::schema::Schema;
use crate::spatial::miles_to_radians;
use crate::store::{DocumentStore, UpdateOptions};

/// Field holding the GeoJSON point consulted by radius searches.
pub const LOCATION_FIELD: &str = "location";

#[derive(Clone)]
pub struct ResourceController {
    store: Arc<dyn DocumentStore>,
    schema: &'static Schema,
}

impl ResourceController {
    pub fn new(store: Arc<dyn DocumentStore>, schema: &'static Schema) -> Self {
        Self { store, schema }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// All records matching `filter`. An empty result is not an error.
    pub async fn list(&self, filter: Filter) -> Result<Vec<Document>> {
        let documents = self.store.find(self.schema, filter).await?;
        Ok(self.redact_all(documents))
    }

    pub async fn get(&self, id: RecordId) -> Result<Document> {
        self.store
            .find_by_id(self.schema, id)
            .await?
            .map(|doc| self.schema.redact(doc))
            .ok_or_else(|| self.not_found(id))
    }

    /// Validate and persist a new record.
    pub async fn create(&self, fields: Fields) -> Result<Document> {
        let document = self.store.create(self.schema, fields).await?;
        debug!(collection = self.schema.collection(), id = %document.id, "record created");
        Ok(self.schema.redact(document))
    }

    /// Merge `fields` into an existing record, re-validating the result.
    pub async fn update(&self, id: RecordId, fields: Fields) -> Result<Document> {
        let options = UpdateOptions {
            return_new: true,
            run_validators: true,
        };
        self.store
            .find_by_id_and_update(self.schema, id, fields, options)
            .await?
            .map(|doc| self.schema.redact(doc))
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        match self.store.find_by_id_and_delete(self.schema, id).await? {
            Some(_) => {
                debug!(collection = self.schema.collection(), id = %id, "record deleted");
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    /// Records whose location lies within `radius_miles` of a postal code.
    ///
    /// The postal code is resolved through `geocoder`; the first coordinate
    /// becomes the centre of a spherical cap with angular radius
    /// `radius_miles / 3963`.
    pub async fn geo_search(
        &self,
        geocoder: &dyn Geocoder,
        postal_code: &str,
        radius_miles: f64,
    ) -> Result<Vec<Document>> {
        if !radius_miles.is_finite() || radius_miles < 0.0 {
            return Err(Error::invalid_parameter(
                "Distance must be a non-negative number of miles",
            ));
        }

        let centre = geocoder
            .geocode(postal_code)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::UpstreamLookupFailure {
                postal_code: postal_code.to_string(),
            })?;

        let radius = miles_to_radians(radius_miles);
        debug!(
            postal_code,
            latitude = centre.latitude,
            longitude = centre.longitude,
            radius,
            "searching within radius"
        );
        let filter = Filter::all().within_sphere(LOCATION_FIELD, centre, radius);
        self.list(filter).await
    }

    fn not_found(&self, id: RecordId) -> Error {
        Error::NotFound {
            resource: self.schema.resource(),
            id: id.to_string(),
        }
    }

    fn redact_all(&self, documents: Vec<Document>) -> Vec<Document> {
        documents
            .into_iter()
            .map(|doc| self.schema.redact(doc))
            .collect()
    }
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("collection", &self.schema.collection())
            .field("backend", &self.store.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::spatial::GeoPoint;
    use crate::store::MemoryStore;
    use futures::future::{self, BoxFuture, FutureExt};
    use serde_json::json;

    struct FixedGeocoder(Vec<GeoPoint>);

    impl Geocoder for FixedGeocoder {
        fn geocode<'a>(&'a self, _postal_code: &'a str) -> BoxFuture<'a, Result<Vec<GeoPoint>>> {
            future::ready(Ok(self.0.clone())).boxed()
        }
    }

    fn controller() -> ResourceController {
        ResourceController::new(Arc::new(MemoryStore::new()), schema::bootcamps())
    }

    #[tokio::test]
    async fn negative_radius_is_rejected_before_geocoding() {
        let geocoder = FixedGeocoder(vec![]);
        let err = controller()
            .geo_search(&geocoder, "02134", -1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn empty_geocode_is_upstream_failure() {
        let geocoder = FixedGeocoder(vec![]);
        let err = controller()
            .geo_search(&geocoder, "00000", 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamLookupFailure { postal_code } if postal_code == "00000"));
    }

    #[tokio::test]
    async fn user_passwords_never_leave_the_controller() {
        let users = ResourceController::new(Arc::new(MemoryStore::new()), schema::users());
        let fields: Fields = serde_json::from_value(json!({
            "name": "John",
            "email": "john@gmail.com",
            "password": "123456"
        }))
        .unwrap();

        let created = users.create(fields).await.unwrap();
        assert!(created.get("password").is_none());
        let fetched = users.get(created.id).await.unwrap();
        assert!(fetched.get("password").is_none());
    }
}
