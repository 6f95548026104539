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

//! Single city page: photos, current weather, the week ahead and a mini map.

use eframe::egui;
use weather_client::codes::temperature_mood;
use weather_client::{format, City, Forecast, WeatherCondition};

use super::{emblem_icon, Action, ScreenContext};
use crate::map::{MapAction, MapContainer, MapView, Marker, Viewport, CITY_ZOOM};
use crate::photos::{GalleryView, PhotoGallery, PHOTO_PLACEHOLDER};
use crate::router::Route;

pub const WEATHER_ERROR: &str = "Не удалось загрузить погоду.";
const PHOTO_HEIGHT: f32 = 220.0;
const MINI_MAP_HEIGHT: f32 = 260.0;
const TITLE_EMBLEM_SIZE: f32 = 36.0;

/// Mini map centred on one city with its marker highlighted
pub fn build_city_map(city: &City) -> MapView {
    let mut view = MapView::new(("city_map", &city.slug), Viewport::new(city.lat, city.lon, CITY_ZOOM));
    view.add_marker(Marker::new(&city.slug, &city.name_ru, city.lat, city.lon).highlighted());
    view
}

#[derive(Debug)]
pub enum WeatherState {
    Loading,
    Failed,
    Ready(Box<Forecast>),
}

pub struct CityScreen {
    slug: String,
    name: String,
    weather: WeatherState,
    selected_day: usize,
    gallery: PhotoGallery<egui::TextureHandle>,
}

impl CityScreen {
    pub fn new(city: &City) -> Self {
        Self {
            slug: city.slug.clone(),
            name: city.name_ru.clone(),
            weather: WeatherState::Loading,
            selected_day: 0,
            gallery: PhotoGallery::for_city(&city.slug),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Apply a forecast result, resetting the day selector
    pub fn set_forecast(&mut self, result: Result<Forecast, String>) {
        self.selected_day = 0;
        self.weather = match result {
            Ok(forecast) => WeatherState::Ready(Box::new(forecast)),
            Err(_) => WeatherState::Failed,
        };
    }

    pub fn retry_forecast(&mut self) {
        self.weather = WeatherState::Loading;
    }

    /// Current temperature from a loaded forecast, rounded for the map marker
    pub fn current_temperature(&self) -> Option<i64> {
        match &self.weather {
            WeatherState::Ready(forecast) => forecast
                .current
                .as_ref()
                .and_then(|c| c.temperature_2m)
                .map(format::round_half_up),
            _ => None,
        }
    }

    /// Next photo candidate to fetch as `(index, filename)`
    pub fn next_photo_request(&mut self) -> Option<(usize, String)> {
        self.gallery.next_request()
    }

    pub fn photo_loaded(&mut self, ctx: &egui::Context, index: usize, image: Option<egui::ColorImage>) {
        let texture = image.map(|image| {
            ctx.load_texture(
                format!("photo_{}_{}", self.slug, index),
                image,
                egui::TextureOptions::LINEAR,
            )
        });
        self.gallery.complete(index, texture);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, cx: &mut ScreenContext<'_>) -> Option<Action> {
        let mut action = None;

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.horizontal(|ui| {
                emblem_icon(
                    ui,
                    cx.emblem_textures.get_or_request(&self.slug, cx.emblems),
                    TITLE_EMBLEM_SIZE,
                );
                ui.heading(&self.name);
            });
            ui.add_space(6.0);

            self.show_photos(ui);
            ui.add_space(8.0);

            if self.show_weather(ui) {
                action = Some(Action::RetryForecast);
            }
            ui.add_space(8.0);

            let emblems = cx.emblems;
            let textures = &mut *cx.emblem_textures;
            if let Some(map) = cx.maps.get_mut(MapContainer::City) {
                let mut emblem = |slug: &str| textures.get_or_request(slug, emblems);
                if let Some(MapAction::OpenCity(slug)) =
                    map.show(ui, MINI_MAP_HEIGHT, cx.layers, &cx.overlays, &mut emblem)
                {
                    action = Some(Action::Navigate(Route::City(slug)));
                }
            }
            ui.add_space(6.0);

            if ui.link("← Ко всем городам").clicked() {
                action = Some(Action::Navigate(Route::CityList));
            }
        });

        action
    }

    fn show_photos(&mut self, ui: &mut egui::Ui) {
        let mut step: i8 = 0;
        match self.gallery.view() {
            GalleryView::Loading => {
                ui.spinner();
            }
            GalleryView::Placeholder => {
                ui.label(egui::RichText::new(PHOTO_PLACEHOLDER).italics());
            }
            GalleryView::Photo { photo, index, count } => {
                ui.add(
                    egui::Image::new(photo)
                        .max_height(PHOTO_HEIGHT)
                        .max_width(ui.available_width())
                        .corner_radius(6.0),
                );
                if count > 1 {
                    ui.horizontal(|ui| {
                        if ui.button("◀").clicked() {
                            step = -1;
                        }
                        ui.label(format!("{} / {}", index + 1, count));
                        if ui.button("▶").clicked() {
                            step = 1;
                        }
                    });
                }
            }
        }
        match step {
            1 => self.gallery.show_next(),
            -1 => self.gallery.show_previous(),
            _ => {}
        }
    }

    /// Weather card and week selector. Returns true when retry was clicked.
    fn show_weather(&mut self, ui: &mut egui::Ui) -> bool {
        let forecast = match &self.weather {
            WeatherState::Loading => {
                super::show_loading(ui, "Загрузка погоды...");
                return false;
            }
            WeatherState::Failed => {
                ui.colored_label(ui.visuals().error_fg_color, WEATHER_ERROR);
                return ui.button("Повторить").clicked();
            }
            WeatherState::Ready(forecast) => forecast,
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            let current = forecast.current.clone().unwrap_or_default();
            let condition = WeatherCondition::from_optional(current.weather_code);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(condition.emoji()).size(40.0));
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(format::temperature(current.temperature_2m, " °C")).size(28.0).strong());
                    ui.label(condition.description());
                });
            });
            ui.label(format::details_line(&current));
            if let Some(temp) = current.temperature_2m {
                ui.label(temperature_mood(temp));
            }
        });
        ui.add_space(6.0);

        let mut selected = self.selected_day;
        ui.horizontal_wrapped(|ui| {
            for index in 0..forecast.day_count() {
                let Some(day) = forecast.day(index) else { continue };
                let text = format!(
                    "{}\n{} {}",
                    format::day_label(index, day.date),
                    WeatherCondition::from_forecast(day.weather_code).emoji(),
                    format::max_min(day.max, day.min)
                );
                if ui.selectable_label(selected == index, text).clicked() {
                    selected = index;
                }
            }
        });

        if let Some(day) = forecast.day(selected) {
            ui.label(format!(
                "{}: {}, {}",
                format::day_label(selected, day.date),
                format::max_min(day.max, day.min),
                WeatherCondition::from_forecast(day.weather_code).description()
            ));
            egui::Grid::new(("day_parts", &self.slug)).striped(true).show(ui, |ui| {
                for part in forecast.day_parts(selected) {
                    ui.label(part.label);
                    ui.label(part.display());
                    ui.end_row();
                }
            });
        }
        self.selected_day = selected;
        false
    }
}
