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

//! Interactive map: tiles, overlays, city markers and popups.

use eframe::egui;
use weather_client::format::marker_temperature;
use weather_client::DEFAULT_CITY_SYMBOL;

use super::layers::{MapLayers, OverlaySettings};
use super::projection::Viewport;
use super::tiles::TileManager;

const MARKER_HIT_RADIUS: f32 = 14.0;
const EMBLEM_SIZE: f32 = 18.0;

/// A city pin on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub slug: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Rounded current temperature, `None` until fetched
    pub temperature: Option<i64>,
    pub highlighted: bool,
}

impl Marker {
    pub fn new(slug: &str, name: &str, lat: f64, lon: f64) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            lat,
            lon,
            temperature: None,
            highlighted: false,
        }
    }

    pub fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }
}

/// Something the user asked for by clicking on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapAction {
    OpenCity(String),
}

/// One live map instance.
#[derive(Debug)]
pub struct MapView {
    id: egui::Id,
    pub viewport: Viewport,
    markers: Vec<Marker>,
    popup: Option<String>,
}

impl MapView {
    pub fn new(id: impl std::hash::Hash, viewport: Viewport) -> Self {
        Self {
            id: egui::Id::new(id),
            viewport,
            markers: Vec::new(),
            popup: None,
        }
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Patch the temperature label of a city's marker
    pub fn set_temperature(&mut self, slug: &str, temperature: Option<i64>) {
        if let Some(marker) = self.markers.iter_mut().find(|m| m.slug == slug) {
            marker.temperature = temperature;
        }
    }

    /// Open the popup for a city, if it has a marker
    pub fn open_popup(&mut self, slug: &str) {
        if self.markers.iter().any(|m| m.slug == slug) {
            self.popup = Some(slug.to_string());
        }
    }

    pub fn popup(&self) -> Option<&str> {
        self.popup.as_deref()
    }

    /// Marker nearest to `pos` within the hit radius
    fn marker_at(&self, pos: egui::Pos2, screen_center: egui::Pos2) -> Option<&Marker> {
        self.markers
            .iter()
            .map(|m| (m, self.viewport.project(m.lat, m.lon, screen_center).distance(pos)))
            .filter(|(_, d)| *d <= MARKER_HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        height: f32,
        layers: &MapLayers,
        overlays: &OverlaySettings,
        emblem: &mut dyn FnMut(&str) -> Option<egui::TextureHandle>,
    ) -> Option<MapAction> {
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(170, 211, 223));

        if response.hovered() {
            let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
            if scroll.abs() > 0.5 {
                self.viewport.zoom_by(scroll / 200.0);
            }
            if (pinch - 1.0).abs() > 0.001 {
                self.viewport.zoom_by(pinch.log2());
            }
        }
        if response.dragged() {
            self.viewport.pan(response.drag_delta());
        }

        draw_tiles(&painter, &self.viewport, rect, &layers.base, egui::Color32::WHITE, ui.ctx());
        let tint = egui::Color32::WHITE.gamma_multiply(overlays.opacity.clamp(0.0, 1.0));
        for overlay in layers.active_overlays(overlays) {
            draw_tiles(&painter, &self.viewport, rect, overlay, tint, ui.ctx());
        }

        for marker in &self.markers {
            let pos = self.viewport.project(marker.lat, marker.lon, center);
            if rect.contains(pos) {
                draw_marker(&painter, pos, marker, emblem(&marker.slug));
            }
        }

        if response.clicked() {
            self.popup = response
                .interact_pointer_pos()
                .and_then(|pos| self.marker_at(pos, center))
                .map(|m| m.slug.clone());
        }

        draw_status(&painter, rect, &layers.base);
        painter.text(
            rect.right_bottom() + egui::vec2(-6.0, -4.0),
            egui::Align2::RIGHT_BOTTOM,
            layers.base.attribution(),
            egui::FontId::proportional(10.0),
            egui::Color32::from_black_alpha(180),
        );

        self.show_zoom_buttons(ui, rect);
        self.show_popup(ui, rect, center)
    }

    fn show_zoom_buttons(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        egui::Area::new(self.id.with("zoom"))
            .fixed_pos(rect.left_top() + egui::vec2(8.0, 8.0))
            .order(egui::Order::Middle)
            .show(ui.ctx(), |ui| {
                if ui.small_button("+").clicked() {
                    self.viewport.zoom_by(1.0);
                }
                if ui.small_button("−").clicked() {
                    self.viewport.zoom_by(-1.0);
                }
            });
    }

    fn show_popup(&mut self, ui: &egui::Ui, rect: egui::Rect, center: egui::Pos2) -> Option<MapAction> {
        let slug = self.popup.as_deref()?;
        let marker = self.markers.iter().find(|m| m.slug == slug)?;
        let pos = self.viewport.project(marker.lat, marker.lon, center);
        if !rect.contains(pos) {
            return None;
        }

        let mut action = None;
        let mut close = false;
        egui::Area::new(self.id.with("popup"))
            .fixed_pos(pos + egui::vec2(12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.strong(&marker.name);
                        if ui.small_button("×").clicked() {
                            close = true;
                        }
                    });
                    ui.label(marker_temperature(marker.temperature));
                    if ui.link("Погода").clicked() {
                        action = Some(MapAction::OpenCity(marker.slug.clone()));
                    }
                });
            });

        if close {
            self.popup = None;
        }
        action
    }
}

fn draw_tiles(
    painter: &egui::Painter,
    viewport: &Viewport,
    rect: egui::Rect,
    manager: &TileManager,
    tint: egui::Color32,
    ctx: &egui::Context,
) {
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    for visible in viewport.visible_tiles(rect.width(), rect.height()) {
        if let Some(texture) = manager.get_tile(visible.tile, ctx) {
            let tile_rect = egui::Rect::from_min_size(
                rect.center() + visible.offset,
                egui::vec2(visible.size, visible.size),
            );
            painter.image(texture.id(), tile_rect, uv, tint);
        }
    }
}

fn draw_marker(
    painter: &egui::Painter,
    pos: egui::Pos2,
    marker: &Marker,
    emblem: Option<egui::TextureHandle>,
) {
    let accent = if marker.highlighted {
        egui::Color32::from_rgb(220, 60, 60)
    } else {
        egui::Color32::from_rgb(30, 110, 200)
    };
    painter.circle_filled(pos, if marker.highlighted { 7.0 } else { 5.0 }, accent);
    painter.circle_stroke(pos, 7.0, egui::Stroke::new(1.5, egui::Color32::WHITE));

    let label = format!("{} {}", marker_temperature(marker.temperature), marker.name);
    let galley = painter.layout_no_wrap(
        label,
        egui::FontId::proportional(11.0),
        egui::Color32::from_rgb(20, 20, 20),
    );

    let padding = egui::vec2(4.0, 2.0);
    let origin = pos + egui::vec2(10.0, -galley.size().y / 2.0 - padding.y);
    let icon_width = EMBLEM_SIZE + 2.0;
    let box_rect = egui::Rect::from_min_size(
        origin,
        egui::vec2(icon_width + galley.size().x, galley.size().y.max(EMBLEM_SIZE)) + padding * 2.0,
    );
    painter.rect_filled(box_rect, 4.0, egui::Color32::from_white_alpha(220));

    let icon_rect = egui::Rect::from_min_size(
        box_rect.left_center() + egui::vec2(padding.x, -EMBLEM_SIZE / 2.0),
        egui::vec2(EMBLEM_SIZE, EMBLEM_SIZE),
    );
    match emblem {
        Some(texture) => {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), icon_rect, uv, egui::Color32::WHITE);
        }
        None => {
            painter.text(
                icon_rect.center(),
                egui::Align2::CENTER_CENTER,
                DEFAULT_CITY_SYMBOL,
                egui::FontId::proportional(13.0),
                egui::Color32::BLACK,
            );
        }
    }

    painter.galley(
        egui::pos2(icon_rect.right() + 2.0, box_rect.center().y - galley.size().y / 2.0),
        galley,
        egui::Color32::BLACK,
    );
}

fn draw_status(painter: &egui::Painter, rect: egui::Rect, base: &TileManager) {
    let errors = base.get_error_count();
    let (message, color) = if errors > 0 {
        (format!("Не удалось загрузить тайлов: {errors}"), egui::Color32::from_rgb(220, 50, 50))
    } else if base.has_loading_tiles() {
        ("Загрузка карты...".to_string(), egui::Color32::from_rgb(230, 160, 40))
    } else {
        return;
    };

    let pos = rect.center_top() + egui::vec2(0.0, 18.0);
    let galley = painter.layout_no_wrap(message, egui::FontId::proportional(12.0), egui::Color32::WHITE);
    let bubble = egui::Rect::from_center_size(pos, galley.size() + egui::vec2(24.0, 12.0));
    painter.rect_filled(bubble, 5.0, color);
    painter.galley(pos - galley.size() / 2.0, galley, egui::Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        let mut view = MapView::new("test_map", Viewport::new(55.75, 37.62, 6.0));
        view.add_marker(Marker::new("moscow", "Москва", 55.7558, 37.6173));
        view.add_marker(Marker::new("tver", "Тверь", 56.8587, 35.9176));
        view
    }

    #[test]
    fn test_markers_start_unknown_then_patch() {
        let mut view = view();
        assert!(view.markers().iter().all(|m| m.temperature.is_none()));
        view.set_temperature("tver", Some(-3));
        view.set_temperature("unknown", Some(10));
        assert_eq!(view.markers()[1].temperature, Some(-3));
        assert_eq!(view.markers()[0].temperature, None);
    }

    #[test]
    fn test_popup_only_for_known_marker() {
        let mut view = view();
        view.open_popup("kazan");
        assert_eq!(view.popup(), None);
        view.open_popup("moscow");
        assert_eq!(view.popup(), Some("moscow"));
    }

    #[test]
    fn test_marker_hit_testing() {
        let view = view();
        let center = egui::pos2(300.0, 200.0);
        let moscow = view.viewport.project(55.7558, 37.6173, center);
        assert_eq!(view.marker_at(moscow + egui::vec2(3.0, 3.0), center).map(|m| m.slug.as_str()), Some("moscow"));
        assert!(view.marker_at(moscow + egui::vec2(40.0, 40.0), center).is_none());
    }
}
