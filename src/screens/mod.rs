//! Screen state and rendering for each route.
//!
//! Screens are rebuilt on every navigation. They render from explicit state
//! and report what the user asked for as an [`Action`]; the app performs it.

pub mod city;
pub mod city_list;
pub mod home;

pub use city::CityScreen;
pub use city_list::CityListScreen;
pub use home::HomeScreen;

use eframe::egui;
use weather_client::{CityList, EmblemMap, DEFAULT_CITY_SYMBOL};

use crate::emblems::EmblemTextures;
use crate::map::{MapLayers, MapRegistry, OverlaySettings};
use crate::router::Route;

/// Shown by every screen that needs the city list when it failed to load
pub const CITY_LIST_ERROR: &str = "Не удалось загрузить список городов";

/// Something a screen wants the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Route),
    RetryForecast,
}

/// Shared state screens render against.
pub struct ScreenContext<'a> {
    /// `None` while loading or after a failed load
    pub cities: Option<&'a CityList>,
    pub cities_failed: bool,
    pub emblems: &'a EmblemMap,
    pub emblem_textures: &'a mut EmblemTextures,
    pub layers: &'a MapLayers,
    pub overlays: OverlaySettings,
    pub maps: &'a mut MapRegistry,
}

/// Emblem image, or the default symbol while it is missing
pub fn emblem_icon(ui: &mut egui::Ui, texture: Option<egui::TextureHandle>, size: f32) {
    match texture {
        Some(texture) => {
            ui.add(egui::Image::new(&texture).fit_to_exact_size(egui::vec2(size, size)));
        }
        None => {
            ui.label(egui::RichText::new(DEFAULT_CITY_SYMBOL).size(size * 0.8));
        }
    }
}

/// Placeholder for routes that need the city list while it loads
pub fn show_loading(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(text);
    });
}
