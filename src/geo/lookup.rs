//! HTTP implementations of the geo lookup services.
//!
//! IP geolocation goes through ip-api.com, city geocoding through the
//! Nominatim search API. Both are queried with a bounded timeout; every
//! failure mode (transport error, non-success status, malformed body) is
//! collapsed into `None` for the resolver's fallthrough.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{GeoLookup, LocationResult, LocationSource};
use crate::common::constants::{
    CITY_GEOCODING_URL, GEO_LOOKUP_TIMEOUT, HTTP_USER_AGENT, IP_GEOLOCATION_URL,
};

/// ip-api.com response body. All fields optional so partial payloads parse.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// One Nominatim search result. Coordinates arrive as numeric strings.
#[derive(Debug, Deserialize)]
struct NominatimItem {
    lat: String,
    lon: String,
}

/// Live lookup client over ip-api.com and Nominatim.
pub struct HttpGeoLookup {
    client: reqwest::blocking::Client,
}

impl HttpGeoLookup {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(GEO_LOOKUP_TIMEOUT)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .context("Failed to build geo lookup HTTP client")?;
        Ok(Self { client })
    }
}

impl GeoLookup for HttpGeoLookup {
    fn ip_location(&self) -> Option<LocationResult> {
        let response = self.client.get(IP_GEOLOCATION_URL).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        location_from_ip_payload(response.json().ok()?)
    }

    fn geocode_city(&self, city: &str) -> Option<LocationResult> {
        let response = self
            .client
            .get(CITY_GEOCODING_URL)
            .query(&[("format", "json"), ("limit", "1"), ("q", city)])
            .send()
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        location_from_geocode_payload(city, response.json().ok()?)
    }
}

/// Validate an ip-api.com payload and turn it into a location.
fn location_from_ip_payload(payload: IpApiResponse) -> Option<LocationResult> {
    if !payload
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("success"))
    {
        return None;
    }
    Some(LocationResult {
        latitude: payload.lat?,
        longitude: payload.lon?,
        city: payload.city.unwrap_or_default(),
        country: payload.country.unwrap_or_default(),
        source: LocationSource::IpGeolocation,
    })
}

/// Turn the first Nominatim match into a location for the queried city.
fn location_from_geocode_payload(city: &str, items: Vec<NominatimItem>) -> Option<LocationResult> {
    let first = items.first()?;
    let latitude: f64 = first.lat.trim().parse().ok()?;
    let longitude: f64 = first.lon.trim().parse().ok()?;
    Some(LocationResult {
        latitude,
        longitude,
        city: city.to_string(),
        country: String::new(),
        source: LocationSource::CityGeocoding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_payload_requires_success_status() {
        let payload: IpApiResponse =
            serde_json::from_str(r#"{"status":"fail","lat":0.0,"lon":0.0}"#).unwrap();
        assert!(location_from_ip_payload(payload).is_none());

        let payload: IpApiResponse = serde_json::from_str(
            r#"{"status":"SUCCESS","lat":52.52,"lon":13.405,"city":"Berlin","country":"Germany"}"#,
        )
        .unwrap();
        let location = location_from_ip_payload(payload).unwrap();
        assert_eq!(location.latitude, 52.52);
        assert_eq!(location.city, "Berlin");
        assert_eq!(location.source, LocationSource::IpGeolocation);
    }

    #[test]
    fn ip_payload_without_coordinates_is_rejected() {
        let payload: IpApiResponse =
            serde_json::from_str(r#"{"status":"success","city":"Berlin"}"#).unwrap();
        assert!(location_from_ip_payload(payload).is_none());
    }

    #[test]
    fn geocode_uses_first_match_and_parses_string_coordinates() {
        let items: Vec<NominatimItem> = serde_json::from_str(
            r#"[{"lat":"48.8566","lon":"2.3522"},{"lat":"0","lon":"0"}]"#,
        )
        .unwrap();
        let location = location_from_geocode_payload("Paris", items).unwrap();
        assert_eq!(location.latitude, 48.8566);
        assert_eq!(location.longitude, 2.3522);
        assert_eq!(location.city, "Paris");
        assert_eq!(location.source, LocationSource::CityGeocoding);
    }

    #[test]
    fn geocode_rejects_empty_list_and_unparsable_coordinates() {
        assert!(location_from_geocode_payload("Paris", Vec::new()).is_none());

        let items: Vec<NominatimItem> =
            serde_json::from_str(r#"[{"lat":"north","lon":"2.35"}]"#).unwrap();
        assert!(location_from_geocode_payload("Paris", items).is_none());
    }
}
