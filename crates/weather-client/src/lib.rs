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

//! Weather client library for the Russian city weather map.
//!
//! This library holds everything that does not need a window: the static
//! city list and its search, emblem lookups, WMO weather code tables, the
//! Open-Meteo forecast client and the resilient JSON fetch it is built on.
//! Layers can be used independently:
//!
//! - **Fetch layer**: bounded retry with linear backoff over any async attempt
//! - **Data layer**: city list, emblem map and the [`DataSource`] they load from
//! - **Forecast layer**: Open-Meteo request building and response types
//! - **Presentation helpers**: day-part synthesis and Russian display strings
//!
//! # Quick Start
//!
//! ```no_run
//! use weather_client::{CityList, DataSource, RetryPolicy, WeatherClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = reqwest::Client::new();
//! let data = DataSource::parse("data/");
//! let cities = data.load_city_list(&http).await?;
//!
//! let client = WeatherClient::new(http, RetryPolicy::default());
//! if let Some(moscow) = cities.first_match("Моск") {
//!     let forecast = client.forecast(moscow).await?;
//!     println!("{:?}", forecast.current);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Search Only
//!
//! ```
//! use weather_client::{City, CityList};
//!
//! let cities = CityList::new(vec![City::new("moscow", "Москва", 55.7558, 37.6173)]).unwrap();
//! assert_eq!(cities.find_by_query("моск").len(), 1);
//! assert!(cities.find_by_query("   ").is_empty());
//! ```

pub mod cities;
pub mod codes;
pub mod dayparts;
pub mod fetch;
pub mod forecast;
pub mod format;

pub use cities::{City, CityList, CityListError, DataSource, EmblemMap, DEFAULT_CITY_SYMBOL};
pub use codes::WeatherCondition;
pub use dayparts::{DayPart, HourlyReading, DAY_SLOTS};
pub use fetch::{fetch_json, fetch_json_with_retry, retry, FetchError, RetryPolicy};
pub use forecast::{CurrentConditions, DailyForecast, Forecast, HourlyForecast, WeatherClient};
