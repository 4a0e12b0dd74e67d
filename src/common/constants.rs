//! Application-wide constants and defaults.

use std::time::Duration;

// Brightness defaults and limits (percent)
pub const DEFAULT_DAY_BRIGHTNESS: u8 = 80;
pub const DEFAULT_NIGHT_BRIGHTNESS: u8 = 33;
pub const MAXIMUM_BRIGHTNESS: u8 = 100;

// Manual schedule defaults (local time of day)
pub const DEFAULT_DAY_START: &str = "07:00";
pub const DEFAULT_NIGHT_START: &str = "19:00";

// Re-evaluation interval bounds (seconds)
pub const DEFAULT_UPDATE_INTERVAL: u64 = 60;
pub const MINIMUM_UPDATE_INTERVAL: u64 = 10;
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 300;

// External service endpoints
pub const IP_GEOLOCATION_URL: &str = "http://ip-api.com/json/";
pub const CITY_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const SUN_TIMES_URL: &str = "https://api.sunrise-sunset.org/json";

// Per-service request timeouts; a hung call bounds the cycle but never the
// trigger funnel, which runs on its own thread
pub const GEO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
pub const SUN_LOOKUP_TIMEOUT: Duration = Duration::from_secs(6);

// Nominatim rejects requests without an identifying User-Agent
pub const HTTP_USER_AGENT: &str = concat!("brightr/", env!("CARGO_PKG_VERSION"));

// Linux sysfs backlight class directory
pub const BACKLIGHT_SYS_DIR: &str = "/sys/class/backlight";

// Exit status codes
pub const EXIT_FAILURE: i32 = 1;
