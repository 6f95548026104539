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

//! Web Mercator projection and the map viewport.

use eframe::egui;
use walkers::TileId;

pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator projection utilities
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to Web Mercator Y in tile units at `zoom`
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(i32::from(zoom));
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to Web Mercator X in tile units at `zoom`
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert tile Y back to latitude
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert tile X back to longitude
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        x / n * 360.0 - 180.0
    }
}

/// Geographic box the map centre is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Russia, roughly from Kaliningrad to Chukotka.
    pub const RUSSIA: Bounds = Bounds {
        min_lat: 41.0,
        max_lat: 82.0,
        min_lon: 19.0,
        max_lon: 180.0,
    };

    pub fn clamp(&self, lat: f64, lon: f64) -> (f64, f64) {
        (
            lat.clamp(self.min_lat, self.max_lat),
            lon.clamp(self.min_lon, self.max_lon),
        )
    }
}

/// Tile to draw, with its top-left offset from the viewport centre in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub tile: TileId,
    pub offset: egui::Vec2,
    pub size: f32,
}

/// Centre, zoom and limits of a map view.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub bounds: Bounds,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f32) -> Self {
        let mut viewport = Self {
            center_lat,
            center_lon,
            zoom,
            min_zoom: 2.0,
            max_zoom: 14.0,
            bounds: Bounds::RUSSIA,
        };
        viewport.clamp();
        viewport
    }

    /// Zoom level used for fetching tiles
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "zoom is clamped to 2..=14"
    )]
    pub fn tile_zoom(&self) -> u8 {
        self.zoom.round().clamp(self.min_zoom, self.max_zoom) as u8
    }

    /// On-screen size of one tile at the current fractional zoom
    pub fn tile_pixel_size(&self) -> f64 {
        TILE_SIZE * 2_f64.powf(f64::from(self.zoom) - f64::from(self.tile_zoom()))
    }

    pub fn set_center(&mut self, lat: f64, lon: f64) {
        self.center_lat = lat;
        self.center_lon = lon;
        self.clamp();
    }

    /// Screen position of a coordinate, given the screen position of the centre
    #[allow(clippy::cast_possible_truncation, reason = "screen coordinates")]
    pub fn project(&self, lat: f64, lon: f64, screen_center: egui::Pos2) -> egui::Pos2 {
        let zoom = self.tile_zoom();
        let size = self.tile_pixel_size();
        let dx = (WebMercator::lon_to_x(lon, zoom) - WebMercator::lon_to_x(self.center_lon, zoom)) * size;
        let dy = (WebMercator::lat_to_y(lat, zoom) - WebMercator::lat_to_y(self.center_lat, zoom)) * size;
        egui::pos2(screen_center.x + dx as f32, screen_center.y + dy as f32)
    }

    /// Move the map so content follows a drag of `delta` pixels
    pub fn pan(&mut self, delta: egui::Vec2) {
        let zoom = self.tile_zoom();
        let size = self.tile_pixel_size();
        let x = WebMercator::lon_to_x(self.center_lon, zoom) - f64::from(delta.x) / size;
        let y = WebMercator::lat_to_y(self.center_lat, zoom) - f64::from(delta.y) / size;
        self.center_lat = WebMercator::tile_to_lat(y, zoom);
        self.center_lon = WebMercator::tile_to_lon(x, zoom);
        self.clamp();
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
    }

    fn clamp(&mut self) {
        let (lat, lon) = self.bounds.clamp(self.center_lat, self.center_lon);
        self.center_lat = lat;
        self.center_lon = lon;
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Tiles covering a viewport of the given size
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "tile indices are bounded by 2^14"
    )]
    pub fn visible_tiles(&self, width: f32, height: f32) -> Vec<VisibleTile> {
        let zoom = self.tile_zoom();
        let size = self.tile_pixel_size();
        let center_x = WebMercator::lon_to_x(self.center_lon, zoom);
        let center_y = WebMercator::lat_to_y(self.center_lat, zoom);

        let tiles_wide = (f64::from(width) / size).ceil() as i32 + 2;
        let tiles_high = (f64::from(height) / size).ceil() as i32 + 2;
        let start_x = center_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_y.floor() as i32 - tiles_high / 2;
        let max_tile = 2_i32.pow(u32::from(zoom));

        let mut tiles = Vec::new();
        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Latitude doesn't wrap
                if tile_y < 0 || tile_y >= max_tile {
                    continue;
                }
                let wrapped_x = tile_x.rem_euclid(max_tile);

                tiles.push(VisibleTile {
                    tile: TileId {
                        x: wrapped_x as u32,
                        y: tile_y as u32,
                        zoom,
                    },
                    offset: egui::vec2(
                        ((f64::from(tile_x) - center_x) * size) as f32,
                        ((f64::from(tile_y) - center_y) * size) as f32,
                    ),
                    size: size as f32,
                });
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_origin() {
        assert!((WebMercator::lon_to_x(0.0, 0) - 0.5).abs() < 1e-9);
        assert!((WebMercator::lat_to_y(0.0, 0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_inverse() {
        let y = WebMercator::lat_to_y(55.7558, 6);
        let x = WebMercator::lon_to_x(37.6173, 6);
        assert!((WebMercator::tile_to_lat(y, 6) - 55.7558).abs() < 1e-6);
        assert!((WebMercator::tile_to_lon(x, 6) - 37.6173).abs() < 1e-6);
    }

    #[test]
    fn test_center_projects_to_screen_center() {
        let viewport = Viewport::new(61.0, 96.0, 3.0);
        let center = egui::pos2(400.0, 300.0);
        let projected = viewport.project(61.0, 96.0, center);
        assert!((projected - center).length() < 0.01);
    }

    #[test]
    fn test_center_and_zoom_clamped() {
        let mut viewport = Viewport::new(10.0, -50.0, 20.0);
        assert!((viewport.center_lat - 41.0).abs() < f64::EPSILON);
        assert!((viewport.center_lon - 19.0).abs() < f64::EPSILON);
        assert!((viewport.zoom - 14.0).abs() < f32::EPSILON);

        viewport.zoom_by(-100.0);
        assert!((viewport.zoom - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pan_moves_content_with_drag() {
        let mut viewport = Viewport::new(61.0, 96.0, 5.0);
        // Dragging right reveals land to the west
        viewport.pan(egui::vec2(100.0, 0.0));
        assert!(viewport.center_lon < 96.0);
        assert!((viewport.center_lat - 61.0).abs() < 1e-6);
    }

    #[test]
    fn test_visible_tiles_cover_view() {
        let viewport = Viewport::new(61.0, 96.0, 3.0);
        let tiles = viewport.visible_tiles(800.0, 600.0);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.tile.zoom == 3 && t.tile.x < 8 && t.tile.y < 8));
    }
}
