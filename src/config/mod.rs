//! Settings management for brightr.
//!
//! Settings are stored as `brightr.toml` in the user configuration directory
//! (override with `--config <dir>`). The file is written by the engine when a
//! new location is resolved and by the external configuration UI; the engine
//! re-reads it on SIGUSR2.
//!
//! ```toml
//! enabled = true            # Master switch for the scheduling engine
//! use_sun_schedule = true   # Prefer sunrise/sunset over the manual schedule
//! use_geolocation = true    # Allow IP-based location lookup
//! start_with_system = false # Autostart flag, owned by the installer
//!
//! day_brightness = 80       # Backlight percentage during the day (0-100)
//! night_brightness = 33     # Backlight percentage during the night (0-100)
//!
//! day_start = "07:00"       # Manual schedule: day period begins (HH:MM)
//! night_start = "19:00"     # Manual schedule: night period begins (HH:MM)
//!
//! city = ""                 # Geocoding fallback when geolocation fails
//! update_interval = 60      # Seconds between periodic re-evaluations (10-300)
//!
//! [last_location]           # Cache of the most recent successful resolution
//! latitude = 52.52
//! longitude = 13.405
//! city = "Berlin"
//! country = "Germany"
//! ```
//!
//! Loading never fails: a missing, unreadable, or unparsable file degrades to
//! defaults, and out-of-range values are clamped. A long-running unattended
//! daemon must not die over a hand-edited settings file.

pub mod loading;

use anyhow::Result;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::common::constants::*;

// Re-export public API
pub use loading::{get_settings_path, set_config_dir};

/// Cached coordinates from the most recent successful location resolution.
///
/// Written back whenever a live lookup (IP geolocation or city geocoding)
/// succeeds, and used as the second step of the resolution fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Persistent application settings.
///
/// All fields have defaults so a partial file loads cleanly. Time-of-day
/// fields are kept as strings in the file and parsed on demand; malformed
/// values fall back to the defaults rather than failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master switch; when false a cycle reports "Disabled" and applies nothing.
    pub enabled: bool,
    /// Prefer the sunrise/sunset schedule over the manual one.
    pub use_sun_schedule: bool,
    /// Allow querying the IP geolocation service.
    pub use_geolocation: bool,
    /// Autostart flag. Persisted for the external autostart manager; the
    /// scheduling engine never reads it.
    pub start_with_system: bool,
    pub day_brightness: u8,
    pub night_brightness: u8,
    /// Manual schedule day start, "HH:MM".
    pub day_start: String,
    /// Manual schedule night start, "HH:MM".
    pub night_start: String,
    /// City name for the geocoding fallback. Empty disables the step.
    pub city: String,
    /// Seconds between periodic re-evaluations.
    pub update_interval: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_location: Option<LastLocation>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            use_sun_schedule: true,
            use_geolocation: true,
            start_with_system: false,
            day_brightness: DEFAULT_DAY_BRIGHTNESS,
            night_brightness: DEFAULT_NIGHT_BRIGHTNESS,
            day_start: DEFAULT_DAY_START.to_string(),
            night_start: DEFAULT_NIGHT_START.to_string(),
            city: String::new(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            last_location: None,
        }
    }
}

impl Settings {
    /// Clamp out-of-range values and reset malformed fields to defaults.
    ///
    /// Called after every load so the rest of the engine can rely on the
    /// invariants (brightness within 0-100, parsable times, sane interval).
    pub fn sanitize(&mut self) {
        if self.day_brightness > MAXIMUM_BRIGHTNESS {
            self.day_brightness = MAXIMUM_BRIGHTNESS;
        }
        if self.night_brightness > MAXIMUM_BRIGHTNESS {
            self.night_brightness = MAXIMUM_BRIGHTNESS;
        }
        if parse_time_of_day(&self.day_start).is_none() {
            log_warning!(
                "Invalid day_start '{}', using default {}",
                self.day_start,
                DEFAULT_DAY_START
            );
            self.day_start = DEFAULT_DAY_START.to_string();
        }
        if parse_time_of_day(&self.night_start).is_none() {
            log_warning!(
                "Invalid night_start '{}', using default {}",
                self.night_start,
                DEFAULT_NIGHT_START
            );
            self.night_start = DEFAULT_NIGHT_START.to_string();
        }
        self.update_interval = self
            .update_interval
            .clamp(MINIMUM_UPDATE_INTERVAL, MAXIMUM_UPDATE_INTERVAL);
    }

    /// Manual schedule day start as a time of day.
    pub fn day_start_time(&self) -> NaiveTime {
        parse_time_of_day(&self.day_start).unwrap_or_else(default_day_start)
    }

    /// Manual schedule night start as a time of day.
    pub fn night_start_time(&self) -> NaiveTime {
        parse_time_of_day(&self.night_start).unwrap_or_else(default_night_start)
    }

    /// Record a freshly resolved location in the settings cache fields.
    pub fn remember_location(&mut self, latitude: f64, longitude: f64, city: &str, country: &str) {
        self.last_location = Some(LastLocation {
            latitude,
            longitude,
            city: city.to_string(),
            country: country.to_string(),
        });
    }

    /// Log a startup summary of the loaded settings.
    pub fn log_settings(&self) {
        log_block_start!("Loaded settings");
        log_indented!("Enabled: {}", if self.enabled { "yes" } else { "no" });
        let mode = if self.use_sun_schedule {
            "Sunrise/sunset"
        } else {
            "Manual schedule"
        };
        log_indented!("Schedule: {}", mode);
        if self.use_sun_schedule {
            log_indented!(
                "Geolocation: {}",
                if self.use_geolocation {
                    "IP-based"
                } else {
                    "disabled"
                }
            );
            if !self.city.is_empty() {
                log_indented!("City fallback: {}", self.city);
            }
            if let Some(ref last) = self.last_location {
                log_indented!(
                    "Last known location: {} {} [{:.4}, {:.4}]",
                    last.city,
                    last.country,
                    last.latitude,
                    last.longitude
                );
            }
        } else {
            log_indented!("Day starts: {}", self.day_start);
            log_indented!("Night starts: {}", self.night_start);
        }
        log_indented!(
            "Brightness: {}% day / {}% night",
            self.day_brightness,
            self.night_brightness
        );
        log_indented!("Update interval: {} seconds", self.update_interval);
    }
}

/// Parse a time-of-day string, accepting "HH:MM" and "HH:MM:SS".
pub(crate) fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn default_day_start() -> NaiveTime {
    // Constant parses; checked by tests
    parse_time_of_day(DEFAULT_DAY_START).unwrap_or_default()
}

fn default_night_start() -> NaiveTime {
    parse_time_of_day(DEFAULT_NIGHT_START).unwrap_or_default()
}

/// Abstract settings store, the boundary to the persisted configuration.
///
/// `load` never fails: implementations degrade to `Settings::default()`.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Production store backed by `brightr.toml` in the config directory.
pub struct TomlSettingsStore;

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Settings {
        loading::load()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        loading::save(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert_eq!(settings.day_brightness, 80);
        assert_eq!(settings.night_brightness, 33);
        assert_eq!(
            settings.day_start_time(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
        assert_eq!(
            settings.night_start_time(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap()
        );
        assert_eq!(settings.update_interval, 60);
    }

    #[test]
    fn sanitize_clamps_brightness_and_interval() {
        let mut settings = Settings {
            day_brightness: 255,
            night_brightness: 101,
            update_interval: 1,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.day_brightness, 100);
        assert_eq!(settings.night_brightness, 100);
        assert_eq!(settings.update_interval, MINIMUM_UPDATE_INTERVAL);

        settings.update_interval = 100_000;
        settings.sanitize();
        assert_eq!(settings.update_interval, MAXIMUM_UPDATE_INTERVAL);
    }

    #[test]
    fn sanitize_resets_malformed_times() {
        crate::common::logger::Log::set_enabled(false);
        let mut settings = Settings {
            day_start: "25:99".to_string(),
            night_start: "not a time".to_string(),
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.day_start, DEFAULT_DAY_START);
        assert_eq!(settings.night_start, DEFAULT_NIGHT_START);
    }

    #[test]
    fn parses_both_time_formats() {
        assert_eq!(
            parse_time_of_day("22:15"),
            NaiveTime::from_hms_opt(22, 15, 0)
        );
        assert_eq!(
            parse_time_of_day("06:30:45"),
            NaiveTime::from_hms_opt(6, 30, 45)
        );
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("7am"), None);
    }

    #[test]
    fn remember_location_updates_cache_fields() {
        let mut settings = Settings::default();
        settings.remember_location(48.8566, 2.3522, "Paris", "France");
        let last = settings.last_location.unwrap();
        assert_eq!(last.latitude, 48.8566);
        assert_eq!(last.city, "Paris");
        assert_eq!(last.country, "France");
    }
}
