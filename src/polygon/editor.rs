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

use super::draw::{DrawControl, DrawMode, DrawSurface};
use super::extrusion;
use super::renderer::LayerRegistry;
use super::sync::{FeatureSync, HeightControl};
use crate::config::AppConfig;
use crate::map::{MapView, MapboxTileSource, TileManager};
use log::error;

/// Polygon editor page: base map, drawing surface, and extrusion layers
pub struct PolygonEditor {
    view: MapView,
    tile_manager: TileManager,
    surface: DrawSurface,
    registry: LayerRegistry,
    sync: FeatureSync,
    last_error: Option<String>,
}

impl PolygonEditor {
    pub fn new(config: &AppConfig) -> Self {
        let source = MapboxTileSource::new(config.map_style.clone(), config.resolve_mapbox_token());

        Self {
            view: MapView::new(config.map_center_lat, config.map_center_lon, config.default_zoom),
            tile_manager: TileManager::new(source),
            surface: DrawSurface::new(),
            registry: LayerRegistry::new(),
            sync: FeatureSync::new(HeightControl::new(config.default_height)),
            last_error: None,
        }
    }

    /// Apply every queued drawing event to the layer registry
    fn apply_draw_events(&mut self) {
        for event in self.surface.take_events() {
            let kind = event.kind;
            if let Err(e) = self.sync.handle_event(&mut self.registry, event) {
                error!("Failed to apply {kind}: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.draw_toolbar(ui);
        ui.separator();
        self.draw_map(ui);
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for mode in [DrawMode::SimpleSelect, DrawMode::DrawPolygon] {
                if ui
                    .selectable_label(self.surface.mode() == mode, mode.label())
                    .clicked()
                {
                    self.surface.change_mode(mode);
                }
            }

            let can_finish = self.surface.pending().len() >= 3;
            if ui.add_enabled(can_finish, egui::Button::new("Finish")).clicked() {
                self.surface.finish_polygon();
            }

            let can_trash = self.surface.selected().is_some();
            if ui.add_enabled(can_trash, egui::Button::new("Trash")).clicked() {
                self.surface.trash();
            }

            ui.separator();

            let height = self.sync.height_mut();
            ui.checkbox(&mut height.hidden, "Hide height");
            if !height.hidden {
                ui.label("Height");
                ui.add(
                    egui::DragValue::new(&mut height.value)
                        .range(0.0..=1000.0)
                        .speed(1.0)
                        .suffix(" m"),
                );
            }

            ui.separator();
            ui.label(format!("Features: {}", self.surface.get_all().features.len()));
        });

        if let Some(message) = self.last_error.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
                if ui.small_button("Dismiss").clicked() {
                    self.last_error = None;
                }
            });
        }
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            egui::Sense::click_and_drag(),
        );

        let rect = response.rect;
        self.view.rect = rect;
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(200, 220, 240));

        if response.hovered() {
            let (zoom_delta, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
            let anchor = response.hover_pos().unwrap_or_else(|| rect.center());
            if (zoom_delta - 1.0).abs() > 0.001 {
                self.view.zoom_by(zoom_delta.log2(), anchor);
            } else if scroll.abs() > 0.0 {
                self.view.zoom_by(scroll / 200.0, anchor);
            }
        }

        self.draw_tiles(ui, &painter, rect);

        let consumed = self.surface.handle_input(ui, &response, &self.view);
        if !consumed && response.dragged() {
            self.view.pan(response.drag_delta());
        }
        self.apply_draw_events();

        let painter = painter.with_clip_rect(rect);
        extrusion::paint_layers(&painter, &self.view, &self.registry);
        self.surface.paint(&painter, &self.view);

        self.draw_tile_status(&painter, rect);
    }

    fn draw_tiles(&self, ui: &egui::Ui, painter: &egui::Painter, rect: egui::Rect) {
        let center = rect.center();
        let visible_tiles = self.tile_manager.get_visible_tiles(
            self.view.center_lat,
            self.view.center_lon,
            self.view.zoom,
            rect.width(),
            rect.height(),
        );

        for tile in visible_tiles {
            if let Some(texture) = self.tile_manager.get_tile(tile.coord, ui.ctx()) {
                let tile_rect = egui::Rect::from_min_size(
                    egui::pos2(center.x + tile.offset_x, center.y + tile.offset_y),
                    egui::vec2(tile.size, tile.size),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
        }
    }

    fn draw_tile_status(&self, painter: &egui::Painter, rect: egui::Rect) {
        let status = if self.tile_manager.has_loading_tiles() {
            Some("Loading map tiles...".to_string())
        } else {
            match self.tile_manager.get_error_count() {
                0 => None,
                n => Some(format!("Failed to load {n} tiles")),
            }
        };

        if let Some(status) = status {
            painter.text(
                rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                status,
                egui::FontId::proportional(12.0),
                egui::Color32::from_rgb(80, 80, 80),
            );
        }
    }
}
