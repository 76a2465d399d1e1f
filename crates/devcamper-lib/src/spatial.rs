//! Spherical geometry for radius searches.
//!
//! Radius queries are expressed as a spherical cap: a centre coordinate and an
//! angular radius in radians. A linear radius in miles converts to radians by
//! dividing by the Earth's radius (3,963 mi). Containment is tested with the
//! haversine central angle between the cap centre and a candidate point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Earth radius used to convert a linear radius into radians.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Central angle in radians between two points (haversine).
    pub fn central_angle_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Read a GeoJSON point (`{"type":"Point","coordinates":[lng, lat]}`).
    ///
    /// Returns `None` for anything that is not a well-formed point.
    pub fn from_geojson(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.get("type").and_then(Value::as_str) != Some("Point") {
            return None;
        }
        let coordinates = object.get("coordinates")?.as_array()?;
        if coordinates.len() != 2 {
            return None;
        }
        let longitude = coordinates[0].as_f64()?;
        let latitude = coordinates[1].as_f64()?;
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }
}

/// Convert a radius in miles into an angular radius in radians.
pub fn miles_to_radians(miles: f64) -> f64 {
    miles / EARTH_RADIUS_MILES
}
