//! Sunrise/sunset acquisition and caching.
//!
//! Sun times come from an external computation service and are cached in a
//! single slot keyed by (date, latitude, longitude). A hit requires an exact
//! match on all three fields; a stale date or moved location forces a live
//! refetch, so yesterday's instants are never reused. An unavailable service
//! yields `None` for the cycle and is retried naturally on the next tick.

pub mod lookup;

use chrono::{NaiveDate, NaiveDateTime};

/// Sunrise and sunset as local-time instants for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// External sunrise/sunset computation service.
///
/// Bounded by the client timeout; any failure mode reports as `None`.
#[cfg_attr(test, mockall::automock)]
pub trait SunTimesSource: Send {
    fn fetch(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Option<SunTimes>;
}

struct CacheSlot {
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    times: SunTimes,
}

/// Fetches sun times through a source, with a single-slot same-day cache.
pub struct SunTimesProvider {
    source: Box<dyn SunTimesSource>,
    cache: Option<CacheSlot>,
}

impl SunTimesProvider {
    pub fn new(source: Box<dyn SunTimesSource>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Get sun times for the given coordinates and date.
    ///
    /// Serves from cache on an exact (date, latitude, longitude) match,
    /// otherwise queries the source and overwrites the slot wholesale on
    /// success. Returns `None` when the service is unavailable, which the
    /// caller treats as "manual schedule for this cycle".
    pub fn get_sun_times(
        &mut self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Option<SunTimes> {
        // Exact-match cache key; bit-identical coordinates only
        #[allow(clippy::float_cmp)]
        if let Some(ref slot) = self.cache
            && slot.date == date
            && slot.latitude == latitude
            && slot.longitude == longitude
        {
            return Some(slot.times);
        }

        let times = self.source.fetch(latitude, longitude, date)?;
        self.cache = Some(CacheSlot {
            date,
            latitude,
            longitude,
            times,
        });
        Some(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_times(date: NaiveDate) -> SunTimes {
        SunTimes {
            sunrise: date.and_hms_opt(6, 12, 0).unwrap(),
            sunset: date.and_hms_opt(20, 31, 0).unwrap(),
        }
    }

    #[test]
    fn same_key_fetches_once() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let mut source = MockSunTimesSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(move |_, _, d| Some(sample_times(d)));

        let mut provider = SunTimesProvider::new(Box::new(source));
        let first = provider.get_sun_times(52.52, 13.405, date).unwrap();
        let second = provider.get_sun_times(52.52, 13.405, date).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn date_rollover_forces_refetch() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let tomorrow = today.succ_opt().unwrap();

        let mut source = MockSunTimesSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(move |_, _, d| Some(sample_times(d)));

        let mut provider = SunTimesProvider::new(Box::new(source));
        let first = provider.get_sun_times(52.52, 13.405, today).unwrap();
        let second = provider.get_sun_times(52.52, 13.405, tomorrow).unwrap();
        assert_ne!(first.sunrise.date(), second.sunrise.date());
    }

    #[test]
    fn moved_coordinates_force_refetch() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let mut source = MockSunTimesSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(move |_, _, d| Some(sample_times(d)));

        let mut provider = SunTimesProvider::new(Box::new(source));
        provider.get_sun_times(52.52, 13.405, date).unwrap();
        provider.get_sun_times(48.8566, 2.3522, date).unwrap();
    }

    #[test]
    fn unavailable_source_leaves_cache_usable() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let mut source = MockSunTimesSource::new();
        let mut call = 0;
        source.expect_fetch().times(2).returning(move |_, _, d| {
            call += 1;
            if call == 1 { None } else { Some(sample_times(d)) }
        });

        let mut provider = SunTimesProvider::new(Box::new(source));
        assert!(provider.get_sun_times(52.52, 13.405, date).is_none());
        // Next tick retries and populates the slot
        assert!(provider.get_sun_times(52.52, 13.405, date).is_some());
    }
}
