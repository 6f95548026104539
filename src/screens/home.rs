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

//! Landing screen: search box and the map of all cities.

use std::time::{Duration, Instant};

use eframe::egui;
use weather_client::CityList;

use super::{Action, ScreenContext, CITY_LIST_ERROR};
use crate::map::{
    MapAction, MapContainer, MapView, Marker, Viewport, HOME_CENTER, HOME_ZOOM, PRESELECT_ZOOM,
};
use crate::router::Route;

pub const SEARCH_HINT: &str = "Поиск города...";
pub const NOT_FOUND_HINT: &str = "Город не найден";
const NOT_FOUND_DURATION: Duration = Duration::from_millis(1500);

/// Placeholder text for the search box at `now`
pub fn search_hint(not_found_until: Option<Instant>, now: Instant) -> &'static str {
    match not_found_until {
        Some(until) if now < until => NOT_FOUND_HINT,
        _ => SEARCH_HINT,
    }
}

/// Home map with one marker per city.
///
/// `preselect` centres the map on a known city and opens its popup.
pub fn build_home_map(cities: Option<&CityList>, preselect: Option<&str>) -> MapView {
    let mut view = MapView::new("home_map", Viewport::new(HOME_CENTER.0, HOME_CENTER.1, HOME_ZOOM));
    let Some(cities) = cities else {
        return view;
    };

    for city in cities {
        view.add_marker(Marker::new(&city.slug, &city.name_ru, city.lat, city.lon));
    }
    if let Some(city) = preselect.and_then(|slug| cities.get(slug)) {
        view.viewport.set_center(city.lat, city.lon);
        view.viewport.zoom = PRESELECT_ZOOM;
        view.open_popup(&city.slug);
    }
    view
}

#[derive(Debug, Default)]
pub struct HomeScreen {
    query: String,
    not_found_until: Option<Instant>,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the search box to a destination. A blank query does nothing.
    fn submit(&mut self, cities: Option<&CityList>, now: Instant) -> Option<Action> {
        if self.query.trim().is_empty() {
            return None;
        }
        if let Some(city) = cities.and_then(|c| c.first_match(&self.query)) {
            return Some(Action::Navigate(Route::City(city.slug.clone())));
        }
        self.query.clear();
        self.not_found_until = Some(now + NOT_FOUND_DURATION);
        None
    }

    pub fn show(&mut self, ui: &mut egui::Ui, cx: &mut ScreenContext<'_>) -> Option<Action> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.heading("Погода в городах России");
            ui.label("Найдите город или выберите его на карте");
        });
        ui.add_space(6.0);

        let now = Instant::now();
        let hint = search_hint(self.not_found_until, now);
        if let Some(until) = self.not_found_until {
            if now < until {
                ui.ctx().request_repaint_after(until - now);
            } else {
                self.not_found_until = None;
            }
        }

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text(hint)
                    .desired_width(280.0),
            );
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Найти").clicked() || enter {
                action = self.submit(cx.cities, now);
            }
            ui.separator();
            if ui.button("Выбрать город из списка").clicked() {
                action = Some(Action::Navigate(Route::CityList));
            }
        });

        if cx.cities_failed {
            ui.colored_label(ui.visuals().warn_fg_color, CITY_LIST_ERROR);
        }
        ui.add_space(6.0);

        let height = ui.available_height();
        let emblems = cx.emblems;
        let textures = &mut *cx.emblem_textures;
        if let Some(map) = cx.maps.get_mut(MapContainer::Home) {
            let mut emblem = |slug: &str| textures.get_or_request(slug, emblems);
            if let Some(MapAction::OpenCity(slug)) = map.show(ui, height, cx.layers, &cx.overlays, &mut emblem) {
                action = Some(Action::Navigate(Route::City(slug)));
            }
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_client::City;

    fn cities() -> CityList {
        CityList::new(vec![
            City::new("moscow", "Москва", 55.7558, 37.6173),
            City::new("kazan", "Казань", 55.8304, 49.0661),
        ])
        .unwrap()
    }

    #[test]
    fn test_search_navigates_to_first_match() {
        let cities = cities();
        let mut screen = HomeScreen::new();
        screen.query = "каз".to_string();
        assert_eq!(
            screen.submit(Some(&cities), Instant::now()),
            Some(Action::Navigate(Route::City("kazan".into())))
        );
    }

    #[test]
    fn test_no_match_clears_and_shows_hint_briefly() {
        let cities = cities();
        let mut screen = HomeScreen::new();
        screen.query = "Париж".to_string();
        let now = Instant::now();

        assert_eq!(screen.submit(Some(&cities), now), None);
        assert!(screen.query.is_empty());
        assert_eq!(search_hint(screen.not_found_until, now), NOT_FOUND_HINT);
        assert_eq!(
            search_hint(screen.not_found_until, now + Duration::from_millis(1600)),
            SEARCH_HINT
        );
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let cities = cities();
        let mut screen = HomeScreen::new();
        screen.query = "   ".to_string();
        let now = Instant::now();

        assert_eq!(screen.submit(Some(&cities), now), None);
        assert!(screen.not_found_until.is_none());
        assert_eq!(search_hint(screen.not_found_until, now), SEARCH_HINT);
    }

    #[test]
    fn test_home_map_markers_start_unknown() {
        let cities = cities();
        let view = build_home_map(Some(&cities), None);
        assert_eq!(view.markers().len(), 2);
        assert!(view.markers().iter().all(|m| m.temperature.is_none()));
        assert!(view.popup().is_none());
        assert!((view.viewport.zoom - HOME_ZOOM).abs() < f32::EPSILON);
    }

    #[test]
    fn test_preselect_centres_and_opens_popup() {
        let cities = cities();
        let view = build_home_map(Some(&cities), Some("kazan"));
        assert_eq!(view.popup(), Some("kazan"));
        assert!((view.viewport.center_lon - 49.0661).abs() < 1e-9);
        assert!((view.viewport.zoom - PRESELECT_ZOOM).abs() < f32::EPSILON);

        let view = build_home_map(Some(&cities), Some("atlantis"));
        assert!(view.popup().is_none());
    }
}
