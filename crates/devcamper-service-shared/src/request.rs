//! Path and query parameter parsing for the bootcamp routes.

use std::collections::HashMap;

use devcamper_lib::{Error as LibError, Filter, RecordId};
use serde::{Deserialize, Serialize};

use crate::report::ErrorReport;

/// Validation for request types extracted by axum.
pub trait Validate {
    fn validate(&self) -> Result<(), ErrorReport>;
}

/// Parse a `{id}` path segment.
pub fn parse_record_id(raw: &str) -> Result<RecordId, ErrorReport> {
    raw.parse::<RecordId>().map_err(ErrorReport::from)
}

/// Turn list query parameters into an equality filter.
///
/// Parameters are sorted by name so the filter does not depend on the order
/// the client sent them in.
pub fn list_filter(params: HashMap<String, String>) -> Filter {
    let mut params: Vec<_> = params.into_iter().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    Filter::from_query_params(params)
}

/// `/radius/{zipcode}/{distance}` segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusParams {
    pub zipcode: String,
    pub distance: String,
}

impl RadiusParams {
    /// The search radius in miles. Call after [`Validate::validate`].
    pub fn distance_miles(&self) -> Result<f64, ErrorReport> {
        self.distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| {
                LibError::invalid_parameter(format!(
                    "Distance '{}' must be a non-negative number of miles",
                    self.distance
                ))
                .into()
            })
    }
}

impl Validate for RadiusParams {
    fn validate(&self) -> Result<(), ErrorReport> {
        let zipcode = self.zipcode.trim();
        let well_formed = !zipcode.is_empty()
            && zipcode.len() <= 12
            && zipcode
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ');
        if !well_formed {
            return Err(LibError::invalid_parameter(format!(
                "Zipcode '{}' is not a postal code",
                self.zipcode
            ))
            .into());
        }
        self.distance_miles().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn radius(zipcode: &str, distance: &str) -> RadiusParams {
        RadiusParams {
            zipcode: zipcode.to_string(),
            distance: distance.to_string(),
        }
    }

    #[test]
    fn valid_radius_parses_miles() {
        let params = radius("02134", "10");
        assert!(params.validate().is_ok());
        assert_eq!(params.distance_miles().unwrap(), 10.0);
        assert_eq!(radius("02134", "2.5").distance_miles().unwrap(), 2.5);
    }

    #[test]
    fn bad_distances_are_rejected() {
        for distance in ["-1", "ten", "NaN", "inf", ""] {
            let err = radius("02134", distance).validate().unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{distance}");
        }
    }

    #[test]
    fn bad_zipcodes_are_rejected() {
        for zipcode in ["", "   ", "02134;DROP", "0123456789012"] {
            assert!(radius(zipcode, "10").validate().is_err(), "{zipcode:?}");
        }
    }

    #[test]
    fn malformed_id_is_bad_request() {
        let err = parse_record_id("5d713995b721c3bb38c1f5d0").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Malformed id '5d713995b721c3bb38c1f5d0'");

        let id = RecordId::generate();
        assert_eq!(parse_record_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn list_filter_is_order_independent() {
        let params = HashMap::from([
            ("housing".to_string(), "true".to_string()),
            ("careers".to_string(), "Business".to_string()),
        ]);
        let filter = list_filter(params);
        let fields: Vec<_> = filter.clauses().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["careers", "housing"]);
    }
}
