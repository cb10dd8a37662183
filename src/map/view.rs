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

use super::tiles::{WebMercator, TILE_SIZE};

/// Minimum and maximum interactive zoom
pub const ZOOM_RANGE: (f32, f32) = (1.0, 18.0);

/// Map camera and the screen rect it is drawn into
#[derive(Debug, Clone, Copy)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f32,
    pub rect: egui::Rect,
}

impl MapView {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f32) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom: zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1),
            rect: egui::Rect::NOTHING,
        }
    }

    fn world_pixels(lon: f64, lat: f64, zoom: f64) -> (f64, f64) {
        let tile = f64::from(TILE_SIZE);
        (
            WebMercator::lon_to_x(lon, zoom) * tile,
            WebMercator::lat_to_y(lat, zoom) * tile,
        )
    }

    /// Screen position of a `[lon, lat]` coordinate
    pub fn to_screen(&self, lon_lat: [f64; 2]) -> egui::Pos2 {
        let zoom = f64::from(self.zoom);
        let (x, y) = Self::world_pixels(lon_lat[0], lon_lat[1], zoom);
        let (cx, cy) = Self::world_pixels(self.center_lon, self.center_lat, zoom);
        let center = self.rect.center();

        egui::pos2(center.x + (x - cx) as f32, center.y + (y - cy) as f32)
    }

    /// `[lon, lat]` coordinate under a screen position
    pub fn to_lon_lat(&self, pos: egui::Pos2) -> [f64; 2] {
        let zoom = f64::from(self.zoom);
        let tile = f64::from(TILE_SIZE);
        let (cx, cy) = Self::world_pixels(self.center_lon, self.center_lat, zoom);
        let center = self.rect.center();

        let x = cx + f64::from(pos.x - center.x);
        let y = cy + f64::from(pos.y - center.y);
        [
            WebMercator::x_to_lon(x / tile, zoom),
            WebMercator::y_to_lat(y / tile, zoom),
        ]
    }

    /// Move the center by a screen-space drag delta
    pub fn pan(&mut self, delta: egui::Vec2) {
        let center = self.rect.center();
        let [lon, lat] = self.to_lon_lat(center - delta);
        self.center_lon = lon;
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    /// Zoom by a number of levels, keeping the coordinate under `anchor` fixed
    pub fn zoom_by(&mut self, levels: f32, anchor: egui::Pos2) {
        let before = self.to_lon_lat(anchor);
        self.zoom = (self.zoom + levels).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        let after = self.to_screen(before);
        self.pan(anchor - after);
    }

    /// Pixels per meter of height at the view center
    pub fn pixels_per_meter(&self) -> f32 {
        (1.0 / WebMercator::meters_per_pixel(self.center_lat, f64::from(self.zoom))) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        let mut view = MapView::new(55.75, 37.62, 8.0);
        view.rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        view
    }

    #[test]
    fn test_center_maps_to_rect_center() {
        let view = view();
        let pos = view.to_screen([37.62, 55.75]);
        assert!((pos.x - 400.0).abs() < 1e-3);
        assert!((pos.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_round_trip() {
        let view = view();
        let [lon, lat] = view.to_lon_lat(egui::pos2(123.0, 456.0));
        let pos = view.to_screen([lon, lat]);
        assert!((pos.x - 123.0).abs() < 1e-2);
        assert!((pos.y - 456.0).abs() < 1e-2);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = view();
        view.zoom_by(100.0, egui::pos2(400.0, 300.0));
        assert_eq!(view.zoom, ZOOM_RANGE.1);
    }
}
