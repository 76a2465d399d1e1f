//! Query filters understood by every document store.
//!
//! A [`Filter`] is a conjunction of per-field conditions. It serializes to the
//! familiar document-database query shape so callers and tests can inspect the
//! exact query a store receives:
//!
//! ```text
//! {"careers":"Business","location":{"$geoWithin":{"$centerSphere":[[-71.1,42.3],0.0025]}}}
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Value};

use crate::record::Document;
use crate::spatial::GeoPoint;

/// A condition applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value; for array fields, the array contains it.
    Equals(Value),
    /// Field holds a GeoJSON point inside the spherical cap.
    WithinSphere { center: GeoPoint, radius: f64 },
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Condition::Equals(expected), Some(Value::Array(items))) if !expected.is_array() => {
                items.iter().any(|item| same_value(item, expected))
            }
            (Condition::Equals(expected), Some(actual)) => same_value(actual, expected),
            (Condition::Equals(_), None) => false,
            (Condition::WithinSphere { center, radius }, Some(actual)) => {
                GeoPoint::from_geojson(actual)
                    .map(|point| center.central_angle_to(&point) <= *radius)
                    .unwrap_or(false)
            }
            (Condition::WithinSphere { .. }, None) => false,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Condition::Equals(value) => value.clone(),
            Condition::WithinSphere { center, radius } => json!({
                "$geoWithin": {
                    "$centerSphere": [[center.longitude, center.latitude], radius]
                }
            }),
        }
    }
}

/// A conjunction of field conditions. The empty filter matches everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses
            .push((field.into(), Condition::Equals(value.into())));
        self
    }

    /// Require `field` to hold a point within `radius` radians of `center`.
    pub fn within_sphere(mut self, field: impl Into<String>, center: GeoPoint, radius: f64) -> Self {
        self.clauses
            .push((field.into(), Condition::WithinSphere { center, radius }));
        self
    }

    /// Build an equality filter from URL query parameters.
    ///
    /// Values that read as JSON booleans or numbers are compared as such
    /// (`acceptGi=true`, `averageCost=10000`); everything else is a string.
    pub fn from_query_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        params
            .into_iter()
            .fold(Self::all(), |filter, (key, raw)| {
                filter.eq(key, scalar_from_query(raw.as_ref()))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    /// Evaluate the filter against a stored document.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clauses.len()))?;
        for (field, condition) in &self.clauses {
            map.serialize_entry(field, &condition.to_value())?;
        }
        map.end()
    }
}

/// JSON equality where numbers compare by value, so `8` equals `8.0`.
fn same_value(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

fn scalar_from_query(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
