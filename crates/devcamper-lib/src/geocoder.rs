//! Postal-code geocoding collaborator.
//!
//! [`Geocoder`] resolves a postal code into zero or more coordinates. An empty
//! result means the input could not be resolved; transport failures surface as
//! errors. [`MapQuestGeocoder`] talks to the MapQuest geocoding API.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::spatial::GeoPoint;

/// Default MapQuest API origin.
pub const DEFAULT_MAPQUEST_BASE_URL: &str = "https://www.mapquestapi.com";

/// Resolve postal codes into coordinates.
pub trait Geocoder: Send + Sync {
    fn geocode<'a>(&'a self, postal_code: &'a str) -> BoxFuture<'a, Result<Vec<GeoPoint>>>;
}

/// Geocoder backed by the MapQuest `geocoding/v1/address` endpoint.
#[derive(Debug, Clone)]
pub struct MapQuestGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devcamper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/geocoding/v1/address", self.base_url)
    }

    async fn lookup(&self, postal_code: &str) -> Result<Vec<GeoPoint>> {
        debug!(postal_code, "geocoding postal code");
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("key", self.api_key.as_str()), ("location", postal_code)])
            .send()
            .await?
            .error_for_status()?;
        let body: MapQuestResponse = response.json().await?;
        body.into_points()
    }
}

impl Geocoder for MapQuestGeocoder {
    fn geocode<'a>(&'a self, postal_code: &'a str) -> BoxFuture<'a, Result<Vec<GeoPoint>>> {
        self.lookup(postal_code).boxed()
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    info: Option<MapQuestInfo>,
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestInfo {
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: Option<MapQuestLatLng>,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

impl MapQuestResponse {
    fn into_points(self) -> Result<Vec<GeoPoint>> {
        if let Some(info) = self.info {
            if info.statuscode != 0 {
                return Err(Error::Geocoder {
                    code: info.statuscode,
                    message: info.messages.join("; "),
                });
            }
        }
        Ok(self
            .results
            .into_iter()
            .flat_map(|result| result.locations)
            .filter_map(|location| location.lat_lng)
            .map(|ll| GeoPoint::new(ll.lat, ll.lng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Vec<GeoPoint>> {
        serde_json::from_str::<MapQuestResponse>(raw)
            .unwrap()
            .into_points()
    }

    #[test]
    fn parses_lat_lng_from_first_location() {
        let raw = r#"{
            "info": {"statuscode": 0, "messages": []},
            "results": [{
                "providedLocation": {"location": "02134"},
                "locations": [{
                    "adminArea5": "Boston",
                    "postalCode": "02134",
                    "latLng": {"lat": 42.35236, "lng": -71.13203}
                }]
            }]
        }"#;
        let points = parse(raw).unwrap();
        assert_eq!(points, vec![GeoPoint::new(42.35236, -71.13203)]);
    }

    #[test]
    fn empty_results_resolve_to_no_points() {
        let points = parse(r#"{"info":{"statuscode":0},"results":[{"locations":[]}]}"#).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn non_zero_status_is_an_error() {
        let err = parse(r#"{"info":{"statuscode":403,"messages":["bad key"]},"results":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Geocoder { code: 403, .. }));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let geocoder =
            MapQuestGeocoder::new("key", "http://localhost:9999/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            geocoder.endpoint(),
            "http://localhost:9999/geocoding/v1/address"
        );
    }
}
