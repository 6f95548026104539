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

//! Tile sources: the OpenStreetMap base map and OpenWeatherMap overlays.

use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

const OSM_SUBDOMAINS: [char; 3] = ['a', 'b', 'c'];

const OSM_ATTRIBUTION: Attribution = Attribution {
    text: "© OpenStreetMap contributors",
    url: "https://www.openstreetmap.org/copyright",
    logo_light: None,
    logo_dark: None,
};

const OWM_ATTRIBUTION: Attribution = Attribution {
    text: "© OpenStreetMap contributors, weather © OpenWeatherMap",
    url: "https://openweathermap.org/",
    logo_light: None,
    logo_dark: None,
};

/// `z/x/y` path segment shared by both providers
fn xyz(tile: TileId) -> String {
    format!("{}/{}/{}", tile.zoom, tile.x, tile.y)
}

/// OpenStreetMap raster tiles, spread over the a-c mirrors by tile position
#[derive(Debug, Clone, Copy)]
pub struct OsmTileSource;

impl TileSource for OsmTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        let mirror = OSM_SUBDOMAINS[((tile_id.x + tile_id.y) % 3) as usize];
        format!("https://{mirror}.tile.openstreetmap.org/{}.png", xyz(tile_id))
    }

    fn attribution(&self) -> Attribution {
        OSM_ATTRIBUTION
    }
}

/// Weather overlay kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherLayer {
    Precipitation,
    Wind,
    Temperature,
}

impl WeatherLayer {
    /// Draw order, bottom first
    pub const ALL: [WeatherLayer; 3] = [Self::Precipitation, Self::Wind, Self::Temperature];

    /// Layer id in OpenWeatherMap tile URLs; also names the tile cache directory
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Precipitation => "precipitation_new",
            Self::Wind => "wind_new",
            Self::Temperature => "temp_new",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Precipitation => "Осадки",
            Self::Wind => "Ветер",
            Self::Temperature => "Температура",
        }
    }
}

/// One OpenWeatherMap overlay bound to an API key.
pub struct OpenWeatherMapSource {
    /// Everything before `z/x/y`
    prefix: String,
    /// `?appid=...` suffix
    query: String,
}

impl OpenWeatherMapSource {
    pub fn new(layer: WeatherLayer, api_key: String) -> Self {
        Self {
            prefix: format!("https://tile.openweathermap.org/map/{}/", layer.as_str()),
            query: format!("?appid={api_key}"),
        }
    }
}

impl TileSource for OpenWeatherMapSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!("{}{}.png{}", self.prefix, xyz(tile_id), self.query)
    }

    fn attribution(&self) -> Attribution {
        OWM_ATTRIBUTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_url() {
        let url = OsmTileSource.tile_url(TileId { x: 1, y: 1, zoom: 3 });
        assert_eq!(url, "https://c.tile.openstreetmap.org/3/1/1.png");
        let url = OsmTileSource.tile_url(TileId { x: 2, y: 1, zoom: 3 });
        assert_eq!(url, "https://a.tile.openstreetmap.org/3/2/1.png");
    }

    #[test]
    fn test_overlay_url_carries_layer_and_key() {
        let source = OpenWeatherMapSource::new(WeatherLayer::Temperature, "abc".to_string());
        let url = source.tile_url(TileId { x: 5, y: 2, zoom: 4 });
        assert_eq!(url, "https://tile.openweathermap.org/map/temp_new/4/5/2.png?appid=abc");
    }
}
