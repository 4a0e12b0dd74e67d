//! Location resolution with a prioritized fallback chain.
//!
//! The resolver produces usable coordinates for sun time calculations by
//! trying, in order:
//!
//! 1. Live IP geolocation (when enabled in settings)
//! 2. The cached last-known location persisted in settings
//! 3. Geocoding the configured city name
//!
//! Each step runs only if the previous one produced nothing. Network errors,
//! timeouts, bad statuses, and malformed payloads are all expected outcomes
//! here; they surface as `None` and drive fallthrough, never as hard errors.
//! Successful live lookups are written back into the settings cache fields so
//! the next offline cycle can still resolve.

pub mod lookup;

use crate::config::Settings;

/// Strategy that produced a location, informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    IpGeolocation,
    LastKnown,
    CityGeocoding,
}

impl LocationSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::IpGeolocation => "IP Geolocation",
            Self::LastKnown => "Last known",
            Self::CityGeocoding => "City Geocoding",
        }
    }
}

/// A resolved geographic location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name, may be empty.
    pub city: String,
    /// Display name, may be empty.
    pub country: String,
    pub source: LocationSource,
}

impl LocationResult {
    /// Format for status display, matching the settings summary style.
    pub fn display(&self) -> String {
        format!(
            "{} {} [{:.4}, {:.4}]",
            self.city, self.country, self.latitude, self.longitude
        )
        .trim_start()
        .to_string()
    }
}

/// External lookup services consumed by the resolver.
///
/// Both calls are bounded by the client timeout and report every failure mode
/// uniformly as `None`.
#[cfg_attr(test, mockall::automock)]
pub trait GeoLookup: Send {
    /// Locate the machine from its public IP address.
    fn ip_location(&self) -> Option<LocationResult>;

    /// Geocode a free-text city name, returning the first match.
    fn geocode_city(&self, city: &str) -> Option<LocationResult>;
}

/// Resolves a location through the fallback chain.
pub struct LocationResolver {
    lookup: Box<dyn GeoLookup>,
}

impl LocationResolver {
    pub fn new(lookup: Box<dyn GeoLookup>) -> Self {
        Self { lookup }
    }

    /// Run the fallback chain.
    ///
    /// Live results (IP geolocation, city geocoding) are recorded in the
    /// settings cache fields as a side effect; the cached step is not, since
    /// it is already persisted. Returns `None` when every step fails or is
    /// inapplicable, which callers treat as "manual schedule required".
    pub fn resolve(&self, settings: &mut Settings) -> Option<LocationResult> {
        if settings.use_geolocation
            && let Some(location) = self.lookup.ip_location()
        {
            settings.remember_location(
                location.latitude,
                location.longitude,
                &location.city,
                &location.country,
            );
            return Some(location);
        }

        if let Some(ref last) = settings.last_location {
            return Some(LocationResult {
                latitude: last.latitude,
                longitude: last.longitude,
                city: last.city.clone(),
                country: last.country.clone(),
                source: LocationSource::LastKnown,
            });
        }

        let city = settings.city.trim();
        if !city.is_empty()
            && let Some(location) = self.lookup.geocode_city(city)
        {
            settings.remember_location(
                location.latitude,
                location.longitude,
                &location.city,
                &location.country,
            );
            return Some(location);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin(source: LocationSource) -> LocationResult {
        LocationResult {
            latitude: 52.52,
            longitude: 13.405,
            city: "Berlin".to_string(),
            country: "Germany".to_string(),
            source,
        }
    }

    #[test]
    fn ip_geolocation_wins_and_is_persisted() {
        let mut lookup = MockGeoLookup::new();
        lookup
            .expect_ip_location()
            .times(1)
            .returning(|| Some(berlin(LocationSource::IpGeolocation)));
        lookup.expect_geocode_city().never();

        let mut settings = Settings {
            city: "Paris".to_string(),
            ..Settings::default()
        };
        let resolver = LocationResolver::new(Box::new(lookup));
        let location = resolver.resolve(&mut settings).unwrap();

        assert_eq!(location.source, LocationSource::IpGeolocation);
        let cached = settings.last_location.unwrap();
        assert_eq!(cached.latitude, 52.52);
        assert_eq!(cached.city, "Berlin");
    }

    #[test]
    fn cached_location_used_without_geocoding() {
        let mut lookup = MockGeoLookup::new();
        lookup.expect_ip_location().times(1).returning(|| None);
        lookup.expect_geocode_city().never();

        let mut settings = Settings {
            city: "Paris".to_string(),
            ..Settings::default()
        };
        settings.remember_location(52.52, 13.405, "Berlin", "Germany");

        let resolver = LocationResolver::new(Box::new(lookup));
        let location = resolver.resolve(&mut settings).unwrap();

        assert_eq!(location.source, LocationSource::LastKnown);
        assert_eq!(location.city, "Berlin");
    }

    #[test]
    fn geocoding_used_when_geolocation_disabled_and_no_cache() {
        let mut lookup = MockGeoLookup::new();
        lookup.expect_ip_location().never();
        lookup
            .expect_geocode_city()
            .times(1)
            .withf(|city| city == "Paris")
            .returning(|_| Some(berlin(LocationSource::CityGeocoding)));

        let mut settings = Settings {
            use_geolocation: false,
            city: "Paris".to_string(),
            ..Settings::default()
        };
        let resolver = LocationResolver::new(Box::new(lookup));
        let location = resolver.resolve(&mut settings).unwrap();

        assert_eq!(location.source, LocationSource::CityGeocoding);
        assert!(settings.last_location.is_some());
    }

    #[test]
    fn all_steps_failing_yields_none() {
        let mut lookup = MockGeoLookup::new();
        lookup.expect_ip_location().times(1).returning(|| None);
        lookup.expect_geocode_city().times(1).returning(|_| None);

        let mut settings = Settings {
            city: "Atlantis".to_string(),
            ..Settings::default()
        };
        let resolver = LocationResolver::new(Box::new(lookup));
        assert!(resolver.resolve(&mut settings).is_none());
        assert!(settings.last_location.is_none());
    }

    #[test]
    fn empty_city_skips_geocoding() {
        let mut lookup = MockGeoLookup::new();
        lookup.expect_ip_location().times(1).returning(|| None);
        lookup.expect_geocode_city().never();

        let mut settings = Settings {
            city: "   ".to_string(),
            ..Settings::default()
        };
        let resolver = LocationResolver::new(Box::new(lookup));
        assert!(resolver.resolve(&mut settings).is_none());
    }
}
