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

//! City list, substring search and emblem lookups.
//!
//! The list is loaded once per session and never written. Slugs are unique;
//! a list containing the same slug twice is rejected at construction.

mod emblems;
mod source;

pub use emblems::{EmblemMap, DEFAULT_CITY_SYMBOL};
pub use source::DataSource;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timezone used when a record does not carry one.
pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";

/// Errors raised while building a city list.
#[derive(Debug, Error)]
pub enum CityListError {
    #[error("duplicate city slug: {0}")]
    DuplicateSlug(String),

    #[error("invalid city list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("city list unavailable: {0}")]
    Fetch(#[from] crate::fetch::FetchError),
}

/// A single city record from `cities.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Unique URL-safe identifier (e.g., "nizhny_novgorod").
    pub slug: String,

    /// Russian display name (e.g., "Нижний Новгород").
    pub name_ru: String,

    /// Latitude in degrees.
    pub lat: f64,

    /// Longitude in degrees.
    pub lon: f64,

    /// IANA timezone used for forecast day boundaries.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl City {
    /// Create a city in the default timezone.
    #[must_use]
    pub fn new(slug: impl Into<String>, name_ru: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            slug: slug.into(),
            name_ru: name_ru.into(),
            lat,
            lon,
            timezone: default_timezone(),
        }
    }

    /// Builder method to set the timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

/// Immutable, slug-indexed list of cities in file order.
#[derive(Debug, Clone, Default)]
pub struct CityList {
    cities: Vec<City>,
    index: HashMap<String, usize>,
}

impl CityList {
    /// Build a list, rejecting duplicate slugs.
    pub fn new(cities: Vec<City>) -> Result<Self, CityListError> {
        let mut index = HashMap::with_capacity(cities.len());
        for (i, city) in cities.iter().enumerate() {
            if index.insert(city.slug.clone(), i).is_some() {
                return Err(CityListError::DuplicateSlug(city.slug.clone()));
            }
        }
        Ok(Self { cities, index })
    }

    /// Parse a JSON array of city records.
    pub fn from_json(json: &[u8]) -> Result<Self, CityListError> {
        let cities: Vec<City> = serde_json::from_slice(json)?;
        Self::new(cities)
    }

    /// All cities in list order.
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, City> {
        self.cities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Look up a city by its exact slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&City> {
        self.index.get(slug).map(|&i| &self.cities[i])
    }

    /// Cities whose Russian name or slug contains the query.
    ///
    /// The query is trimmed and lowercased; for slug matching, whitespace
    /// runs become underscores so "нижний новгород" and "nizhny novgorod"
    /// both work. A blank query matches nothing.
    #[must_use]
    pub fn find_by_query(&self, query: &str) -> Vec<&City> {
        let norm = query.trim().to_lowercase();
        if norm.is_empty() {
            return Vec::new();
        }
        let slug_query = norm.split_whitespace().collect::<Vec<_>>().join("_");

        self.cities
            .iter()
            .filter(|c| {
                c.name_ru.to_lowercase().contains(&norm)
                    || c.slug.to_lowercase().contains(&slug_query)
            })
            .collect()
    }

    /// First search hit in list order, used when a single destination is needed.
    #[must_use]
    pub fn first_match(&self, query: &str) -> Option<&City> {
        self.find_by_query(query).into_iter().next()
    }
}

impl<'a> IntoIterator for &'a CityList {
    type Item = &'a City;
    type IntoIter = std::slice::Iter<'a, City>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CityList {
        CityList::new(vec![
            City::new("moscow", "Москва", 55.7558, 37.6173),
            City::new("spb", "Санкт-Петербург", 59.9343, 30.3351),
            City::new("nizhny_novgorod", "Нижний Новгород", 56.2965, 43.9361),
            City::new("balashikha", "Балашиха", 55.8094, 37.9581),
            City::new("vladivostok", "Владивосток", 43.1198, 131.8869)
                .with_timezone("Asia/Vladivostok"),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_by_partial_name() {
        let cities = sample();
        let found = cities.find_by_query("Моск");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "moscow");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let cities = sample();
        assert_eq!(cities.find_by_query("  МОСКВА ").len(), 1);
        assert_eq!(cities.find_by_query("SPB")[0].name_ru, "Санкт-Петербург");
    }

    #[test]
    fn test_find_slug_with_spaces() {
        let cities = sample();
        let found = cities.find_by_query("nizhny   novgorod");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "nizhny_novgorod");
    }

    #[test]
    fn test_find_no_match_or_blank() {
        let cities = sample();
        assert!(cities.find_by_query("Париж").is_empty());
        assert!(cities.find_by_query("").is_empty());
        assert!(cities.find_by_query("   \t").is_empty());
    }

    #[test]
    fn test_first_match_keeps_list_order() {
        let cities = sample();
        assert_eq!(cities.first_match("о").map(|c| c.slug.as_str()), Some("moscow"));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let result = CityList::new(vec![
            City::new("moscow", "Москва", 55.7558, 37.6173),
            City::new("moscow", "Москва 2", 55.0, 37.0),
        ]);
        assert!(matches!(result, Err(CityListError::DuplicateSlug(slug)) if slug == "moscow"));
    }

    #[test]
    fn test_from_json_default_timezone() {
        let json = r#"[{"slug":"kazan","name_ru":"Казань","lat":55.8304,"lon":49.0661}]"#;
        let cities = CityList::from_json(json.as_bytes()).unwrap();
        assert_eq!(cities.get("kazan").unwrap().timezone, DEFAULT_TIMEZONE);
        assert!(cities.get("ufa").is_none());
    }
}
