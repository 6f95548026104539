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

//! Night/morning/day/evening breakdown picked from hourly data.
//!
//! Each slot takes the hourly reading on the same date whose hour is
//! closest to the slot's target hour. Ties go to the earlier entry.

use crate::codes::WeatherCondition;
use crate::format::{self, MISSING};
use crate::forecast::HourlyForecast;

/// A named part of the day and its target local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlot {
    pub label: &'static str,
    pub hour: u32,
}

/// The four slots shown under the weather card, in display order.
pub const DAY_SLOTS: [DaySlot; 4] = [
    DaySlot { label: "Ночь", hour: 3 },
    DaySlot { label: "Утро", hour: 9 },
    DaySlot { label: "День", hour: 15 },
    DaySlot { label: "Вечер", hour: 21 },
];

/// One hourly sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyReading {
    pub temperature: Option<f64>,
    pub weather_code: Option<i32>,
}

/// A slot label with the reading chosen for it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPart {
    pub label: &'static str,
    pub reading: Option<HourlyReading>,
}

impl DayPart {
    /// `+5°C, Снег`, or `—` when the slot has no hourly entry.
    ///
    /// An entry with a null temperature still names its condition: `—, Ясно`.
    #[must_use]
    pub fn display(&self) -> String {
        match self.reading {
            Some(reading) => format!(
                "{}, {}",
                format::temperature(reading.temperature, "°C"),
                WeatherCondition::from_forecast(reading.weather_code)
            ),
            None => MISSING.to_string(),
        }
    }
}

fn hour_of(time: &str) -> Option<u32> {
    time.get(11..13)?.parse().ok()
}

/// Index of the entry on `date` whose hour is nearest `hour`.
///
/// Entries shorter than `YYYY-MM-DDTHH` or on other dates are ignored.
#[must_use]
pub fn nearest_hour_index<S: AsRef<str>>(date: &str, hour: u32, times: &[S]) -> Option<usize> {
    let date = date.get(..10)?;
    let mut best: Option<usize> = None;
    let mut best_delta = 25;

    for (i, time) in times.iter().enumerate() {
        let time = time.as_ref();
        if time.len() < 13 || time.get(..10) != Some(date) {
            continue;
        }
        let Some(h) = hour_of(time) else {
            continue;
        };
        let delta = h.abs_diff(hour);
        if delta < best_delta {
            best_delta = delta;
            best = Some(i);
        }
    }
    best
}

/// Readings for all [`DAY_SLOTS`] on a date.
#[must_use]
pub fn day_parts_for_date(date: &str, hourly: &HourlyForecast) -> Vec<DayPart> {
    DAY_SLOTS
        .iter()
        .map(|slot| {
            let reading = nearest_hour_index(date, slot.hour, &hourly.time).map(|i| HourlyReading {
                temperature: hourly.temperature_2m.get(i).copied().flatten(),
                weather_code: hourly.weather_code.get(i).copied().flatten(),
            });
            DayPart {
                label: slot.label,
                reading,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(entries: &[(&str, Option<f64>, Option<i32>)]) -> HourlyForecast {
        HourlyForecast {
            time: entries.iter().map(|e| e.0.to_string()).collect(),
            temperature_2m: entries.iter().map(|e| e.1).collect(),
            weather_code: entries.iter().map(|e| e.2).collect(),
        }
    }

    #[test]
    fn test_exact_hour_wins() {
        let times = ["2026-10-16T08:00", "2026-10-16T09:00", "2026-10-16T10:00"];
        assert_eq!(nearest_hour_index("2026-10-16", 9, &times), Some(1));
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let times = ["2026-10-16T02:00", "2026-10-16T04:00"];
        assert_eq!(nearest_hour_index("2026-10-16", 3, &times), Some(0));
    }

    #[test]
    fn test_other_dates_and_short_entries_ignored() {
        let times = ["2026-10-15T03:00", "2026-10-16", "2026-10-16T23:00"];
        assert_eq!(nearest_hour_index("2026-10-16", 3, &times), Some(2));
        assert_eq!(nearest_hour_index("2026-10-17", 3, &times), None);
    }

    #[test]
    fn test_day_parts_display() {
        let data = hourly(&[
            ("2026-10-16T03:00", Some(-4.6), Some(71)),
            ("2026-10-16T09:00", Some(1.2), None),
            ("2026-10-16T15:00", None, Some(3)),
        ]);
        let parts = day_parts_for_date("2026-10-16", &data);
        let labels: Vec<_> = parts.iter().map(|p| p.label).collect();
        assert_eq!(labels, ["Ночь", "Утро", "День", "Вечер"]);

        assert_eq!(parts[0].display(), "-5°C, Снег");
        // Missing code decodes as clear sky
        assert_eq!(parts[1].display(), "+1°C, Ясно");
        assert_eq!(parts[2].display(), "—, Пасмурно");
        // Evening falls back to the 15:00 entry, which has no temperature
        assert_eq!(parts[3].display(), "—, Пасмурно");
    }

    #[test]
    fn test_null_temperature_keeps_condition() {
        let data = hourly(&[("2026-10-16T21:00", None, None)]);
        let parts = day_parts_for_date("2026-10-16", &data);
        assert!(parts.iter().all(|p| p.display() == "—, Ясно"));

        let parts = day_parts_for_date("2026-10-17", &data);
        assert!(parts.iter().all(|p| p.display() == MISSING));
    }

    #[test]
    fn test_empty_hourly() {
        let parts = day_parts_for_date("2026-10-16", &HourlyForecast::default());
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.reading.is_none()));
    }
}
