//! HTTP implementation of the sun times source.
//!
//! Queries api.sunrise-sunset.org with `formatted=0` so instants arrive as
//! ISO 8601 UTC strings, then converts them to local time.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;

use super::{SunTimes, SunTimesSource};
use crate::common::constants::{HTTP_USER_AGENT, SUN_LOOKUP_TIMEOUT, SUN_TIMES_URL};

#[derive(Debug, Deserialize)]
struct SunApiResponse {
    status: Option<String>,
    results: Option<SunApiResults>,
}

#[derive(Debug, Deserialize)]
struct SunApiResults {
    sunrise: Option<String>,
    sunset: Option<String>,
}

/// Live client for the sunrise-sunset.org computation service.
pub struct HttpSunTimesSource {
    client: reqwest::blocking::Client,
}

impl HttpSunTimesSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SUN_LOOKUP_TIMEOUT)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .context("Failed to build sun times HTTP client")?;
        Ok(Self { client })
    }
}

impl SunTimesSource for HttpSunTimesSource {
    fn fetch(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Option<SunTimes> {
        let response = self
            .client
            .get(SUN_TIMES_URL)
            .query(&[
                ("lat", latitude.to_string()),
                ("lng", longitude.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
                ("formatted", "0".to_string()),
            ])
            .send()
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        sun_times_from_response(response.json().ok()?)
    }
}

/// Validate the payload and convert the UTC instants to local time.
fn sun_times_from_response(payload: SunApiResponse) -> Option<SunTimes> {
    if payload.status.as_deref() != Some("OK") {
        return None;
    }
    let results = payload.results?;
    Some(SunTimes {
        sunrise: parse_utc_instant(results.sunrise.as_deref()?)?,
        sunset: parse_utc_instant(results.sunset.as_deref()?)?,
    })
}

fn parse_utc_instant(text: &str) -> Option<chrono::NaiveDateTime> {
    let instant = DateTime::parse_from_rfc3339(text).ok()?;
    Some(instant.with_timezone(&Local).naive_local())
}
