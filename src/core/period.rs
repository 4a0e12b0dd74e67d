//! Pure day/night period evaluation.
//!
//! Given a single captured `now`, these functions decide the current period
//! and the instant of the next transition. No I/O, no clock access: the
//! caller samples the wall clock exactly once per cycle and every decision in
//! that cycle (including the displayed status) derives from the same moment,
//! so a boundary can never fall between decision and display.
//!
//! Boundaries are half-open: the instant equal to a start time belongs to the
//! period beginning at that instant.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// The brightness regime currently in effect.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Period {
    Day,
    Night,
}

impl Period {
    pub fn is_day(&self) -> bool {
        matches!(self, Self::Day)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
        }
    }
}

/// Which schedule inputs produced a decision.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ScheduleSource {
    /// Sun-based schedule with live or cached sun times.
    SunTimes,
    /// Manual schedule chosen by configuration.
    Manual,
    /// Manual schedule because sun times could not be fetched this cycle.
    ManualSunUnavailable,
    /// Manual schedule because no location could be resolved.
    ManualLocationRequired,
}

impl ScheduleSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SunTimes => "Sunrise/sunset",
            Self::Manual => "Manual schedule",
            Self::ManualSunUnavailable => "Manual schedule (sunrise/sunset unavailable)",
            Self::ManualLocationRequired => "Manual schedule (location required)",
        }
    }
}

/// Outcome of one schedule evaluation. Produced fresh every cycle.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ScheduleDecision {
    pub period: Period,
    pub next_change: NaiveDateTime,
    pub source: ScheduleSource,
}

/// Evaluate the sun-based schedule.
///
/// `sunrise` and `sunset` are same-day local instants with sunrise before
/// sunset. Day runs from sunrise (inclusive) to sunset (exclusive); outside
/// that window the next change is the coming sunrise, advanced by one day
/// once sunset has passed.
pub fn period_from_sun_times(
    now: NaiveDateTime,
    sunrise: NaiveDateTime,
    sunset: NaiveDateTime,
) -> (Period, NaiveDateTime) {
    if now >= sunrise && now < sunset {
        return (Period::Day, sunset);
    }

    let next = if now >= sunset {
        sunrise + Duration::days(1)
    } else {
        sunrise
    };
    (Period::Night, next)
}

/// Evaluate the manual schedule against `now`'s calendar date.
///
/// The conventional case (`day_start < night_start`) keeps the day period
/// within one calendar date. An inverted configuration means the day period
/// wraps past midnight: at or after `day_start` is Day until tomorrow's
/// `night_start`, and the early hours before `night_start` still belong to
/// yesterday's day period.
pub fn period_from_manual_times(
    now: NaiveDateTime,
    day_start: NaiveTime,
    night_start: NaiveTime,
) -> (Period, NaiveDateTime) {
    let today = now.date();
    let today_day = today.and_time(day_start);
    let today_night = today.and_time(night_start);

    if day_start < night_start {
        if now < today_day {
            return (Period::Night, today_day);
        }
        if now < today_night {
            return (Period::Day, today_night);
        }
        return (Period::Night, today_day + Duration::days(1));
    }

    // Day period wraps past midnight
    if now >= today_day {
        return (Period::Day, today_night + Duration::days(1));
    }
    if now < today_night {
        return (Period::Day, today_night);
    }
    (Period::Night, today_day)
}
