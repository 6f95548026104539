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

use log::info;

use super::sources::{OpenWeatherMapSource, OsmTileSource, WeatherLayer};
use super::tiles::TileManager;

/// Which overlays to draw and how strongly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub precipitation: bool,
    pub wind: bool,
    pub temperature: bool,
    pub opacity: f32,
}

impl OverlaySettings {
    pub fn enabled(&self, layer: WeatherLayer) -> bool {
        match layer {
            WeatherLayer::Precipitation => self.precipitation,
            WeatherLayer::Wind => self.wind,
            WeatherLayer::Temperature => self.temperature,
        }
    }
}

/// Base map plus the weather overlays available for the configured API key.
///
/// Shared by every map view; tiles fetched for one view are reused by the next.
#[derive(Debug)]
pub struct MapLayers {
    pub base: TileManager,
    overlays: Vec<(WeatherLayer, TileManager)>,
}

impl MapLayers {
    pub fn new(api_key: Option<String>) -> Self {
        let overlays = match api_key {
            Some(key) => WeatherLayer::ALL
                .iter()
                .map(|&layer| {
                    let source = OpenWeatherMapSource::new(layer, key.clone());
                    (layer, TileManager::new(layer.as_str(), source))
                })
                .collect(),
            None => {
                info!("No OpenWeatherMap API key, weather overlays disabled");
                Vec::new()
            }
        };

        Self {
            base: TileManager::new("osm", OsmTileSource),
            overlays,
        }
    }

    pub fn has_overlays(&self) -> bool {
        !self.overlays.is_empty()
    }

    /// Overlays switched on in `settings`, in draw order
    pub fn active_overlays<'a>(
        &'a self,
        settings: &'a OverlaySettings,
    ) -> impl Iterator<Item = &'a TileManager> + 'a {
        self.overlays
            .iter()
            .filter(move |(layer, _)| settings.enabled(*layer))
            .map(|(_, manager)| manager)
    }
}
