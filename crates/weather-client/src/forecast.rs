// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Open-Meteo forecast client.
//!
//! Every response field is optional: the API omits blocks that were not
//! requested and fills gaps in hourly/daily arrays with `null`.

use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::cities::City;
use crate::dayparts::{self, DayPart};
use crate::fetch::{fetch_json, fetch_json_with_retry, FetchError, RetryPolicy};
use crate::format::round_half_up;

/// Default Open-Meteo forecast endpoint.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Number of forecast days requested for the city view.
pub const FORECAST_DAYS: usize = 7;

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,surface_pressure,wind_speed_10m,relative_humidity_2m,apparent_temperature";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";

/// Query value characters left as-is; everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// Current conditions block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    /// Surface pressure in hPa.
    pub surface_pressure: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Per-day arrays, index-aligned on `time`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// Per-hour arrays, index-aligned on `time` (`YYYY-MM-DDTHH:MM`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HourlyForecast {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// Summary of one forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary<'a> {
    pub date: &'a str,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Full forecast response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Forecast {
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub daily: DailyForecast,
    #[serde(default)]
    pub hourly: HourlyForecast,
}

impl Forecast {
    /// Number of days available, capped at [`FORECAST_DAYS`].
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.daily.time.len().min(FORECAST_DAYS)
    }

    #[must_use]
    pub fn day(&self, index: usize) -> Option<DaySummary<'_>> {
        if index >= self.day_count() {
            return None;
        }
        Some(DaySummary {
            date: &self.daily.time[index],
            max: self.daily.temperature_2m_max.get(index).copied().flatten(),
            min: self.daily.temperature_2m_min.get(index).copied().flatten(),
            weather_code: self.daily.weather_code.get(index).copied().flatten(),
        })
    }

    /// Night/morning/day/evening breakdown for a forecast day.
    #[must_use]
    pub fn day_parts(&self, index: usize) -> Vec<DayPart> {
        match self.day(index) {
            Some(day) => dayparts::day_parts_for_date(day.date, &self.hourly),
            None => Vec::new(),
        }
    }
}

/// Minimal response for the current-temperature lookup.
#[derive(Debug, Deserialize)]
struct CurrentTemperatureResponse {
    current: Option<CurrentTemperature>,
}

#[derive(Debug, Deserialize)]
struct CurrentTemperature {
    temperature_2m: Option<f64>,
}

fn build_url(base: &str, params: &[(&str, String)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, QUERY_VALUE)))
        .collect();
    format!("{}?{}", base, query.join("&"))
}

/// Forecast request URL for a city.
#[must_use]
pub fn forecast_url(base: &str, city: &City) -> String {
    build_url(
        base,
        &[
            ("latitude", city.lat.to_string()),
            ("longitude", city.lon.to_string()),
            ("timezone", city.timezone.clone()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ],
    )
}

/// Current-temperature-only request URL.
#[must_use]
pub fn current_temperature_url(base: &str, lat: f64, lon: f64) -> String {
    build_url(
        base,
        &[
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current", "temperature_2m".to_string()),
        ],
    )
}

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl WeatherClient {
    #[must_use]
    pub fn new(http: reqwest::Client, policy: RetryPolicy) -> Self {
        Self {
            http,
            base_url: OPEN_METEO_URL.to_string(),
            policy,
        }
    }

    /// Builder method to point at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full forecast for a city, retried on failure.
    pub async fn forecast(&self, city: &City) -> Result<Forecast, FetchError> {
        let url = forecast_url(&self.base_url, city);
        fetch_json_with_retry(&self.http, &url, &self.policy).await
    }

    /// Rounded current temperature. Any failure is reported as unknown.
    pub async fn current_temperature(&self, lat: f64, lon: f64) -> Option<i64> {
        let url = current_temperature_url(&self.base_url, lat, lon);
        match fetch_json::<CurrentTemperatureResponse>(&self.http, &url).await {
            Ok(response) => response
                .current
                .and_then(|c| c.temperature_2m)
                .map(round_half_up),
            Err(e) => {
                debug!("Current temperature unavailable for {},{}: {}", lat, lon, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "current": {
            "temperature_2m": -4.6,
            "apparent_temperature": -9.1,
            "relative_humidity_2m": 86,
            "wind_speed_10m": 3.2,
            "surface_pressure": 1002.4,
            "weather_code": 71
        },
        "daily": {
            "time": ["2026-10-16", "2026-10-17"],
            "temperature_2m_max": [-2.0, null],
            "temperature_2m_min": [-8.5, -6.0],
            "weather_code": [71, 3]
        },
        "hourly": {
            "time": ["2026-10-16T02:00", "2026-10-16T09:00", "2026-10-17T15:00"],
            "temperature_2m": [-7.0, -5.0, -3.0],
            "weather_code": [3, 71, null]
        }
    }"#;

    #[test]
    fn test_forecast_url_params() {
        let city = City::new("kazan", "Казань", 55.8304, 49.0661);
        let url = forecast_url(OPEN_METEO_URL, &city);
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=55.8304"));
        assert!(url.contains("timezone=Europe%2FMoscow"));
        assert!(url.contains("forecast_days=7"));
        assert!(url.contains("hourly=temperature_2m%2Cweather_code"));
    }

    #[test]
    fn test_current_temperature_url() {
        let url = current_temperature_url("https://example.org/v1/forecast", 54.5, 73.25);
        assert_eq!(
            url,
            "https://example.org/v1/forecast?latitude=54.5&longitude=73.25&current=temperature_2m"
        );
    }

    #[test]
    fn test_parse_sample() {
        let forecast: Forecast = serde_json::from_str(SAMPLE).unwrap();
        let current = forecast.current.as_ref().unwrap();
        assert_eq!(current.weather_code, Some(71));
        assert_eq!(forecast.day_count(), 2);

        let tomorrow = forecast.day(1).unwrap();
        assert_eq!(tomorrow.max, None);
        assert_eq!(tomorrow.min, Some(-6.0));
        assert!(forecast.day(2).is_none());
    }

    #[test]
    fn test_missing_blocks_default() {
        let forecast: Forecast = serde_json::from_str(r#"{"current": {"temperature_2m": 1.0}}"#).unwrap();
        assert_eq!(forecast.day_count(), 0);
        assert!(forecast.day_parts(0).is_empty());
        assert_eq!(forecast.current.unwrap().weather_code, None);
    }

    #[tokio::test]
    async fn test_unreachable_current_temperature_is_unknown() {
        // Nothing listens on the discard port
        let client = WeatherClient::new(reqwest::Client::new(), RetryPolicy::default())
            .with_base_url("http://127.0.0.1:9/v1/forecast");
        assert_eq!(client.current_temperature(55.75, 37.61).await, None);
    }

    #[test]
    fn test_day_parts_from_forecast() {
        let forecast: Forecast = serde_json::from_str(SAMPLE).unwrap();
        let parts = forecast.day_parts(0);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].reading.unwrap().temperature, Some(-7.0));
        assert_eq!(parts[1].reading.unwrap().weather_code, Some(71));
    }
}
