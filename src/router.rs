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

//! Location-hash routing.
//!
//! The application location is a hash fragment such as `#/cities` or
//! `#/city/kazan`. Every navigation bumps a generation counter; background
//! results tagged with an older generation belong to a screen that is no
//! longer shown and are dropped.

use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in a slug segment.
const SLUG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

/// Monotonic navigation counter.
pub type Generation = u64;

/// One of the fixed screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    CityList,
    City(String),
}

impl Route {
    /// Parse a location hash. Unrecognised input falls back to [`Route::Home`].
    pub fn parse(hash: &str) -> Self {
        let hash = hash.trim();
        let path = hash.strip_prefix('#').unwrap_or(hash);

        match path {
            "" | "/" => return Self::Home,
            "/cities" | "/cities/" => return Self::CityList,
            _ => {}
        }

        if let Some(rest) = path.strip_prefix("/city/") {
            let segment = rest.split('/').next().unwrap_or_default();
            if !segment.is_empty() {
                let slug = percent_decode_str(segment).decode_utf8_lossy().into_owned();
                return Self::City(slug);
            }
        }

        Self::Home
    }

    /// Canonical hash for this route; round-trips through [`Route::parse`].
    pub fn to_hash(&self) -> String {
        match self {
            Self::Home => "#/".to_string(),
            Self::CityList => "#/cities".to_string(),
            Self::City(slug) => format!("#/city/{}", utf8_percent_encode(slug, SLUG_SEGMENT)),
        }
    }

    /// Whether the screen needs the city list.
    pub fn needs_city_list(&self) -> bool {
        !matches!(self, Self::Home)
    }
}

/// Current location with back history.
#[derive(Debug)]
pub struct Router {
    location: String,
    route: Route,
    history: Vec<String>,
    generation: Generation,
}

impl Router {
    /// Start at `initial`, unless a start parameter names a city.
    pub fn new(initial: &str, start_param: Option<&str>) -> Self {
        let location = match start_param.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Route::City(slug.to_string()).to_hash(),
            None => initial.to_string(),
        };
        let route = Route::parse(&location);
        debug!("Initial location {} -> {:?}", location, route);
        Self {
            location,
            route,
            history: Vec::new(),
            generation: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a result tagged with `generation` still belongs on screen.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Move to a new location, pushing the old one onto the history.
    pub fn navigate(&mut self, hash: &str) -> &Route {
        if hash != self.location {
            let previous = std::mem::replace(&mut self.location, hash.to_string());
            self.history.push(previous);
        }
        self.apply()
    }

    pub fn navigate_to(&mut self, route: &Route) -> &Route {
        self.navigate(&route.to_hash())
    }

    /// Return to the previous location, if there is one.
    pub fn back(&mut self) -> Option<&Route> {
        let previous = self.history.pop()?;
        self.location = previous;
        Some(self.apply())
    }

    /// Re-enter the current location, e.g. after data it depends on arrives.
    pub fn reload(&mut self) -> &Route {
        self.apply()
    }

    fn apply(&mut self) -> &Route {
        self.route = Route::parse(&self.location);
        self.generation += 1;
        debug!(
            "Navigated to {} -> {:?} (generation {})",
            self.location, self.route, self.generation
        );
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_variants() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("#"), Route::Home);
        assert_eq!(Route::parse("#/"), Route::Home);
    }

    #[test]
    fn test_city_list() {
        assert_eq!(Route::parse("#/cities"), Route::CityList);
        assert_eq!(Route::parse("#/cities/"), Route::CityList);
    }

    #[test]
    fn test_city_slug() {
        assert_eq!(Route::parse("#/city/kazan"), Route::City("kazan".into()));
        assert_eq!(
            Route::parse("#/city/nizhny_novgorod/extra"),
            Route::City("nizhny_novgorod".into())
        );
        assert_eq!(
            Route::parse("#/city/%D0%BC%D0%BE%D1%81%D0%BA%D0%B2%D0%B0"),
            Route::City("москва".into())
        );
    }

    #[test]
    fn test_unrecognised_falls_back_home() {
        assert_eq!(Route::parse("#/weather"), Route::Home);
        assert_eq!(Route::parse("#/city/"), Route::Home);
        assert_eq!(Route::parse("#/citiesx"), Route::Home);
    }

    #[test]
    fn test_hash_round_trip() {
        for route in [
            Route::Home,
            Route::CityList,
            Route::City("saint petersburg".into()),
            Route::City("ufa".into()),
        ] {
            assert_eq!(Route::parse(&route.to_hash()), route);
        }
        assert_eq!(Route::City("a b".into()).to_hash(), "#/city/a%20b");
    }

    #[test]
    fn test_start_param_overrides_initial() {
        let router = Router::new("#/cities", Some("omsk"));
        assert_eq!(router.route(), &Route::City("omsk".into()));
        assert_eq!(router.location(), "#/city/omsk");

        let router = Router::new("#/cities", Some("  "));
        assert_eq!(router.route(), &Route::CityList);
    }

    #[test]
    fn test_navigate_and_back() {
        let mut router = Router::new("#/", None);
        router.navigate("#/cities");
        router.navigate_to(&Route::City("kazan".into()));
        assert_eq!(router.route(), &Route::City("kazan".into()));

        assert_eq!(router.back(), Some(&Route::CityList));
        assert_eq!(router.back(), Some(&Route::Home));
        assert!(router.back().is_none());
    }

    #[test]
    fn test_generation_marks_stale_results() {
        let mut router = Router::new("#/", None);
        router.navigate("#/city/kazan");
        let issued = router.generation();
        assert!(router.is_current(issued));

        router.navigate("#/city/omsk");
        assert!(!router.is_current(issued));
    }
}
