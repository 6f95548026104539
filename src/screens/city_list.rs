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

use std::collections::HashMap;

use eframe::egui;
use weather_client::{format, City, CityList};

use super::{emblem_icon, Action, ScreenContext};
use crate::router::Route;

const ROW_EMBLEM_SIZE: f32 = 24.0;

/// What pressing Enter in the filter box does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Exactly one city matched
    Open(String),
    /// Several matched; keep the filter
    Filter,
    /// Nothing matched; show the full list again
    Reset,
}

pub fn submit_outcome(cities: &CityList, query: &str) -> SubmitOutcome {
    match cities.find_by_query(query).as_slice() {
        [city] => SubmitOutcome::Open(city.slug.clone()),
        [] => SubmitOutcome::Reset,
        _ => SubmitOutcome::Filter,
    }
}

/// Cities shown for a filter; a blank filter shows all of them
pub fn visible_cities<'a>(cities: &'a CityList, filter: &str) -> Vec<&'a City> {
    if filter.trim().is_empty() {
        cities.iter().collect()
    } else {
        cities.find_by_query(filter)
    }
}

#[derive(Debug, Default)]
pub struct CityListScreen {
    filter: String,
    temperatures: HashMap<String, Option<i64>>,
}

impl CityListScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_temperature(&mut self, slug: String, temperature: Option<i64>) {
        self.temperatures.insert(slug, temperature);
    }

    fn submit(&mut self, cities: &CityList) -> Option<Action> {
        match submit_outcome(cities, &self.filter) {
            SubmitOutcome::Open(slug) => Some(Action::Navigate(Route::City(slug))),
            SubmitOutcome::Filter => None,
            SubmitOutcome::Reset => {
                self.filter.clear();
                None
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, cx: &mut ScreenContext<'_>, cities: &CityList) -> Option<Action> {
        let mut action = None;

        ui.heading("Города");
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Фильтр по названию...")
                    .desired_width(280.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                action = self.submit(cities);
            }
        });
        ui.separator();

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for city in visible_cities(cities, &self.filter) {
                ui.horizontal(|ui| {
                    emblem_icon(ui, cx.emblem_textures.get_or_request(&city.slug, cx.emblems), ROW_EMBLEM_SIZE);
                    if ui.link(&city.name_ru).clicked() {
                        action = Some(Action::Navigate(Route::City(city.slug.clone())));
                    }
                    let temperature = self.temperatures.get(&city.slug).copied().flatten();
                    ui.weak(format::marker_temperature(temperature));
                });
            }
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> CityList {
        CityList::new(vec![
            City::new("moscow", "Москва", 55.7558, 37.6173),
            City::new("murmansk", "Мурманск", 68.9585, 33.0827),
            City::new("kazan", "Казань", 55.8304, 49.0661),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_match_opens_city() {
        assert_eq!(submit_outcome(&cities(), "каз"), SubmitOutcome::Open("kazan".into()));
    }

    #[test]
    fn test_several_matches_keep_filter() {
        assert_eq!(submit_outcome(&cities(), "М"), SubmitOutcome::Filter);
    }

    #[test]
    fn test_no_match_resets() {
        let cities = cities();
        assert_eq!(submit_outcome(&cities, "Париж"), SubmitOutcome::Reset);

        let mut screen = CityListScreen::new();
        screen.filter = "Париж".into();
        assert_eq!(screen.submit(&cities), None);
        assert!(screen.filter.is_empty());
        assert_eq!(visible_cities(&cities, &screen.filter).len(), 3);
    }

    #[test]
    fn test_live_filter() {
        let cities = cities();
        let names: Vec<_> = visible_cities(&cities, "мур").iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(names, ["murmansk"]);
        assert_eq!(visible_cities(&cities, "   ").len(), 3);
    }
}
