//! DevCamper library entry points.
//!
//! This crate holds everything below the HTTP layer: record identity and
//! field maps, collection schemas and their validation rules, query filters
//! with spherical radius matching, the [`DocumentStore`] collaborator with
//! SQLite and in-memory implementations, the [`Geocoder`] collaborator, and the
//! [`ResourceController`] that maps CRUD operations onto a store. Services
//! should go through the controller instead of calling stores directly.
//!

#![deny(warnings)]

pub mod controller;
pub mod error;
pub mod geocoder;
pub mod query;
pub mod record;
pub mod schema;
pub mod spatial;
pub mod store;

pub use controller::{ResourceController, LOCATION_FIELD};
pub use error::{Error, ErrorKind, FieldError, Result};
pub use geocoder::{Geocoder, MapQuestGeocoder, DEFAULT_MAPQUEST_BASE_URL};
pub use query::{Condition, Filter};
pub use record::{Document, Fields, RecordId};
pub use schema::Schema;
pub use spatial::{miles_to_radians, GeoPoint, EARTH_RADIUS_MILES};
pub use store::{DocumentStore, MemoryStore, SqliteStore, UpdateOptions};
