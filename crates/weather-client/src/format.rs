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

//! Russian display strings for weather values.

use chrono::{Datelike, NaiveDate};

use crate::forecast::CurrentConditions;

/// Placeholder for a value that is not available.
pub const MISSING: &str = "—";

const HPA_TO_MM_HG: f64 = 0.750_062;

/// Round half up, so -0.5 becomes 0 and 2.5 becomes 3.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "temperatures and pressures fit in i64")]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Integer with an explicit `+` for positive values.
#[must_use]
pub fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Rounded, signed temperature followed by `suffix`, or `—` when missing.
///
/// ```
/// use weather_client::format::temperature;
/// assert_eq!(temperature(Some(4.6), " °C"), "+5 °C");
/// assert_eq!(temperature(Some(-0.4), "°"), "0°");
/// assert_eq!(temperature(None, " °C"), "—");
/// ```
#[must_use]
pub fn temperature(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(t) => format!("{}{}", signed(round_half_up(t)), suffix),
        None => MISSING.to_string(),
    }
}

/// Marker label: `+5°` or `—°` while unknown.
#[must_use]
pub fn marker_temperature(value: Option<i64>) -> String {
    match value {
        Some(t) => format!("{}°", signed(t)),
        None => format!("{MISSING}°"),
    }
}

/// Surface pressure converted from hPa to millimetres of mercury.
#[must_use]
pub fn pressure_mm_hg(hpa: f64) -> i64 {
    round_half_up(hpa * HPA_TO_MM_HG)
}

/// `+12° / +3°` style max/min pair.
#[must_use]
pub fn max_min(max: Option<f64>, min: Option<f64>) -> String {
    match (max, min) {
        (Some(max), Some(min)) => format!(
            "{}° / {}°",
            signed(round_half_up(max)),
            signed(round_half_up(min))
        ),
        _ => MISSING.to_string(),
    }
}

/// Label for a forecast day: "Сегодня", "Завтра", then `D.M`.
#[must_use]
pub fn day_label(index: usize, date: &str) -> String {
    match index {
        0 => "Сегодня".to_string(),
        1 => "Завтра".to_string(),
        _ => NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d")
            .map(|d| format!("{}.{}", d.day(), d.month()))
            .unwrap_or_else(|_| date.to_string()),
    }
}

/// "Ощущается · Влажность · Ветер · Давление" line for the weather card.
#[must_use]
pub fn details_line(current: &CurrentConditions) -> String {
    let feels = temperature(current.apparent_temperature, " °C");
    let humidity = current
        .relative_humidity_2m
        .map_or_else(|| MISSING.to_string(), |h| format!("{h}%"));
    let wind = current
        .wind_speed_10m
        .map_or_else(|| MISSING.to_string(), |w| format!("{w} м/с"));
    let pressure = current
        .surface_pressure
        .map_or_else(|| MISSING.to_string(), |p| format!("{} мм рт. ст.", pressure_mm_hg(p)));

    format!("Ощущается: {feels} · Влажность: {humidity} · Ветер: {wind} · Давление: {pressure}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_temperatures() {
        assert_eq!(temperature(Some(12.4), " °C"), "+12 °C");
        assert_eq!(temperature(Some(-7.5), " °C"), "-7 °C");
        assert_eq!(temperature(Some(-7.6), "°C"), "-8°C");
        assert_eq!(temperature(Some(0.2), "°"), "0°");
    }

    #[test]
    fn test_marker_temperature() {
        assert_eq!(marker_temperature(Some(3)), "+3°");
        assert_eq!(marker_temperature(Some(-12)), "-12°");
        assert_eq!(marker_temperature(None), "—°");
    }

    #[test]
    fn test_pressure_conversion() {
        assert_eq!(pressure_mm_hg(1013.25), 760);
        assert_eq!(pressure_mm_hg(993.0), 745);
    }

    #[test]
    fn test_max_min() {
        assert_eq!(max_min(Some(5.4), Some(-2.6)), "+5° / -3°");
        assert_eq!(max_min(Some(5.4), None), "—");
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(day_label(0, "2026-10-16"), "Сегодня");
        assert_eq!(day_label(1, "2026-10-17"), "Завтра");
        assert_eq!(day_label(2, "2026-10-18"), "18.10");
        assert_eq!(day_label(3, "garbage"), "garbage");
    }

    #[test]
    fn test_details_line() {
        let current = CurrentConditions {
            apparent_temperature: Some(-3.2),
            relative_humidity_2m: Some(81.0),
            wind_speed_10m: Some(4.5),
            surface_pressure: None,
            ..Default::default()
        };
        assert_eq!(
            details_line(&current),
            "Ощущается: -3 °C · Влажность: 81% · Ветер: 4.5 м/с · Давление: —"
        );
    }
}
