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

//! Interactive polygon drawing surface.
//!
//! The surface owns the drawn geometry and reports every change as a
//! [`DrawEvent`]. Events are queued and drained by the editor once per frame
//! rather than delivered through callbacks, so the handler can borrow the
//! renderer mutably.
//!
//! Gestures:
//! - draw mode: click adds a vertex, double-click or Enter closes the ring,
//!   Escape cancels
//! - select mode: click selects, dragging a vertex handle or the body of the
//!   selected polygon moves it and reports an update on release
//! - Delete or Backspace removes the selected polygon

use super::feature::{feature_collection, Feature};
use geo::{Contains, LineString, Point, Polygon};
use log::debug;
use std::fmt;
use uuid::Uuid;

/// Grab radius of a vertex handle in pixels
const HANDLE_RADIUS: f32 = 8.0;

const MIN_RING_VERTICES: usize = 3;

/// Lifecycle event kind raised by the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawEventKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for DrawEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "draw.create",
            Self::Update => "draw.update",
            Self::Delete => "draw.delete",
        })
    }
}

/// Lifecycle event with the features it affects
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEvent {
    pub kind: DrawEventKind,
    pub features: Vec<Feature>,
}

impl DrawEvent {
    pub fn new(kind: DrawEventKind, features: Vec<Feature>) -> Self {
        Self { kind, features }
    }
}

/// Interaction mode of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    SimpleSelect,
    DrawPolygon,
}

impl DrawMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::SimpleSelect => "Select",
            Self::DrawPolygon => "Polygon",
        }
    }
}

/// Operations the editor needs from a drawing control
pub trait DrawControl {
    fn mode(&self) -> DrawMode;

    fn change_mode(&mut self, mode: DrawMode);

    /// Every feature currently on the surface
    fn get_all(&self) -> geojson::FeatureCollection;

    /// Drain events raised since the last call, oldest first
    fn take_events(&mut self) -> Vec<DrawEvent>;
}

#[derive(Debug, Clone, Copy)]
enum DragTarget {
    Vertex(usize),
    Body { last: [f64; 2] },
}

/// Editing keys pressed during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shortcuts {
    /// Enter
    pub finish: bool,
    /// Escape
    pub cancel: bool,
    /// Delete or Backspace
    pub delete: bool,
}

impl Shortcuts {
    fn read(ui: &egui::Ui) -> Self {
        ui.input(|i| Self {
            finish: i.key_pressed(egui::Key::Enter),
            cancel: i.key_pressed(egui::Key::Escape),
            delete: i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
        })
    }
}

/// Supplies the projection between screen and geographic coordinates
pub trait Projection {
    fn to_screen(&self, lon_lat: [f64; 2]) -> egui::Pos2;
    fn to_lon_lat(&self, pos: egui::Pos2) -> [f64; 2];
}

impl Projection for crate::map::MapView {
    fn to_screen(&self, lon_lat: [f64; 2]) -> egui::Pos2 {
        Self::to_screen(self, lon_lat)
    }

    fn to_lon_lat(&self, pos: egui::Pos2) -> [f64; 2] {
        Self::to_lon_lat(self, pos)
    }
}

/// Drawing surface holding the authoritative polygon geometry
#[derive(Debug, Default)]
pub struct DrawSurface {
    mode: DrawMode,
    features: Vec<Feature>,
    pending: Vec<[f64; 2]>,
    selected: Option<String>,
    drag: Option<DragTarget>,
    events: Vec<DrawEvent>,
}

impl DrawControl for DrawSurface {
    fn mode(&self) -> DrawMode {
        self.mode
    }

    fn change_mode(&mut self, mode: DrawMode) {
        if mode != self.mode {
            self.pending.clear();
            self.drag = None;
            if mode == DrawMode::DrawPolygon {
                self.selected = None;
            }
            self.mode = mode;
        }
    }

    fn get_all(&self) -> geojson::FeatureCollection {
        feature_collection(&self.features)
    }

    fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }
}

impl DrawSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Vertices of the polygon under construction
    pub fn pending(&self) -> &[[f64; 2]] {
        &self.pending
    }

    fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    fn feature_mut(&mut self, id: &str) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    fn emit(&mut self, kind: DrawEventKind, feature: Feature) {
        debug!("{kind} for feature {}", feature.id);
        self.events.push(DrawEvent::new(kind, vec![feature]));
    }

    /// Append a vertex to the polygon under construction
    pub fn add_vertex(&mut self, lon_lat: [f64; 2]) {
        if self.mode == DrawMode::DrawPolygon {
            self.pending.push(lon_lat);
        }
    }

    /// Close the ring under construction into a new feature.
    ///
    /// Returns the new feature id, or `None` while fewer than three vertices
    /// have been placed. The surface returns to select mode with the new
    /// feature selected.
    pub fn finish_polygon(&mut self) -> Option<String> {
        if self.pending.len() < MIN_RING_VERTICES {
            return None;
        }

        let id = Uuid::new_v4().to_string();
        let feature = Feature::polygon(id.clone(), &self.pending);
        self.pending.clear();

        self.features.push(feature.clone());
        self.emit(DrawEventKind::Create, feature);

        self.mode = DrawMode::SimpleSelect;
        self.selected = Some(id.clone());
        Some(id)
    }

    /// Abandon the polygon under construction
    pub fn cancel_polygon(&mut self) {
        self.pending.clear();
    }

    /// Select the topmost polygon containing the coordinate, or clear the
    /// selection if there is none
    pub fn select_at(&mut self, lon_lat: [f64; 2]) -> Option<&str> {
        let point = Point::new(lon_lat[0], lon_lat[1]);
        self.selected = self
            .features
            .iter()
            .rev()
            .find(|f| to_geo_polygon(f).contains(&point))
            .map(|f| f.id.clone());
        self.selected.as_deref()
    }

    /// Move one vertex of a feature without reporting it
    pub fn move_vertex(&mut self, id: &str, index: usize, lon_lat: [f64; 2]) {
        if let Some(feature) = self.feature_mut(id) {
            let mut ring = feature.exterior_ring();
            if let Some(vertex) = ring.get_mut(index) {
                *vertex = lon_lat;
                set_ring(feature, &ring);
            }
        }
    }

    /// Translate a whole feature without reporting it
    pub fn translate(&mut self, id: &str, d_lon: f64, d_lat: f64) {
        if let Some(feature) = self.feature_mut(id) {
            let ring: Vec<[f64; 2]> = feature
                .exterior_ring()
                .into_iter()
                .map(|[lon, lat]| [lon + d_lon, lat + d_lat])
                .collect();
            set_ring(feature, &ring);
        }
    }

    /// Report the current geometry of a feature as an update
    pub fn commit_update(&mut self, id: &str) {
        if let Some(feature) = self.feature(id).cloned() {
            self.emit(DrawEventKind::Update, feature);
        }
    }

    /// Remove the selected feature and report it as deleted
    pub fn trash(&mut self) -> Option<String> {
        let id = self.selected.take()?;
        let pos = self.features.iter().position(|f| f.id == id)?;
        let feature = self.features.remove(pos);
        self.emit(DrawEventKind::Delete, feature);
        Some(id)
    }

    /// Apply keyboard shortcuts read this frame. Nothing happens while a
    /// text or value field holds keyboard focus.
    pub fn apply_shortcuts(&mut self, keys: Shortcuts, keyboard_captured: bool) {
        if keyboard_captured {
            return;
        }

        match self.mode {
            DrawMode::DrawPolygon => {
                if keys.finish {
                    self.finish_polygon();
                }
                if keys.cancel {
                    self.cancel_polygon();
                }
            }
            DrawMode::SimpleSelect => {
                if keys.delete {
                    self.trash();
                }
            }
        }
    }

    /// Handle pointer and keyboard input for one frame.
    ///
    /// Returns `true` when the surface consumed a drag, in which case the map
    /// must not pan.
    pub fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        projection: &impl Projection,
    ) -> bool {
        self.apply_shortcuts(Shortcuts::read(ui), ui.ctx().wants_keyboard_input());

        match self.mode {
            DrawMode::DrawPolygon => {
                if response.double_clicked() {
                    self.finish_polygon();
                } else if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.add_vertex(projection.to_lon_lat(pos));
                    }
                }
                false
            }
            DrawMode::SimpleSelect => {
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.select_at(projection.to_lon_lat(pos));
                    }
                }
                self.handle_drag(response, projection)
            }
        }
    }

    fn handle_drag(&mut self, response: &egui::Response, projection: &impl Projection) -> bool {
        let pointer = response.interact_pointer_pos();

        if response.drag_started() {
            self.drag = pointer.and_then(|pos| self.pick_drag_target(pos, projection));
        }

        let (Some(target), Some(id)) = (self.drag, self.selected.clone()) else {
            return false;
        };

        if response.dragged() {
            if let Some(pos) = pointer {
                let lon_lat = projection.to_lon_lat(pos);
                match target {
                    DragTarget::Vertex(index) => self.move_vertex(&id, index, lon_lat),
                    DragTarget::Body { last } => {
                        self.translate(&id, lon_lat[0] - last[0], lon_lat[1] - last[1]);
                        self.drag = Some(DragTarget::Body { last: lon_lat });
                    }
                }
            }
        }

        if response.drag_stopped() {
            self.drag = None;
            self.commit_update(&id);
        }

        true
    }

    /// Vertex handle of the selected feature under the pointer, else the body
    /// of whichever feature is under it (which becomes selected)
    fn pick_drag_target(&mut self, pos: egui::Pos2, projection: &impl Projection) -> Option<DragTarget> {
        if let Some(selected) = self.selected.as_deref().and_then(|id| self.feature(id)) {
            let handle = selected
                .exterior_ring()
                .iter()
                .position(|v| projection.to_screen(*v).distance(pos) <= HANDLE_RADIUS);
            if let Some(index) = handle {
                return Some(DragTarget::Vertex(index));
            }
        }

        let lon_lat = projection.to_lon_lat(pos);
        self.select_at(lon_lat)?;
        Some(DragTarget::Body { last: lon_lat })
    }

    /// Paint outlines, vertex handles and the ring under construction
    pub fn paint(&self, painter: &egui::Painter, projection: &impl Projection) {
        let outline = egui::Stroke::new(1.5, egui::Color32::from_rgb(60, 140, 220));
        let selected_outline = egui::Stroke::new(2.5, egui::Color32::from_rgb(250, 180, 40));

        for feature in &self.features {
            let points: Vec<egui::Pos2> = feature
                .exterior_ring()
                .into_iter()
                .map(|v| projection.to_screen(v))
                .collect();
            let is_selected = self.selected.as_deref() == Some(feature.id.as_str());

            painter.add(egui::Shape::closed_line(
                points.clone(),
                if is_selected { selected_outline } else { outline },
            ));

            if is_selected {
                for point in points {
                    painter.circle_filled(point, 4.0, egui::Color32::WHITE);
                    painter.circle_stroke(point, 4.0, selected_outline);
                }
            }
        }

        if !self.pending.is_empty() {
            let points: Vec<egui::Pos2> = self.pending.iter().map(|v| projection.to_screen(*v)).collect();
            painter.add(egui::Shape::line(points.clone(), outline));
            for point in points {
                painter.circle_filled(point, 3.5, egui::Color32::from_rgb(60, 140, 220));
            }
        }
    }
}

fn set_ring(feature: &mut Feature, ring: &[[f64; 2]]) {
    feature.geometry = Feature::polygon(feature.id.clone(), ring).geometry;
}

fn to_geo_polygon(feature: &Feature) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = feature
        .exterior_ring()
        .into_iter()
        .map(|[lon, lat]| (lon, lat))
        .collect();
    Polygon::new(LineString::from(coords), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_square(surface: &mut DrawSurface) -> String {
        surface.change_mode(DrawMode::DrawPolygon);
        for v in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            surface.add_vertex(v);
        }
        surface.finish_polygon().unwrap()
    }

    #[test]
    fn test_finish_emits_create() {
        let mut surface = DrawSurface::new();
        let id = draw_square(&mut surface);

        let events = surface.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DrawEventKind::Create);
        assert_eq!(events[0].features[0].id, id);
        assert_eq!(surface.mode(), DrawMode::SimpleSelect);
        assert_eq!(surface.get_all().features.len(), 1);
        assert!(surface.take_events().is_empty());
    }

    #[test]
    fn test_too_few_vertices_does_not_create() {
        let mut surface = DrawSurface::new();
        surface.change_mode(DrawMode::DrawPolygon);
        surface.add_vertex([0.0, 0.0]);
        surface.add_vertex([1.0, 0.0]);

        assert_eq!(surface.finish_polygon(), None);
        assert!(surface.take_events().is_empty());
        assert_eq!(surface.pending().len(), 2);
    }

    #[test]
    fn test_vertices_ignored_outside_draw_mode() {
        let mut surface = DrawSurface::new();
        surface.add_vertex([0.0, 0.0]);
        assert!(surface.pending().is_empty());
    }

    #[test]
    fn test_select_and_translate_emits_update() {
        let mut surface = DrawSurface::new();
        let id = draw_square(&mut surface);
        surface.take_events();

        assert_eq!(surface.select_at([5.0, 5.0]), None);
        assert_eq!(surface.select_at([0.5, 0.5]), Some(id.as_str()));

        surface.translate(&id, 1.0, 2.0);
        surface.commit_update(&id);

        let events = surface.take_events();
        assert_eq!(events[0].kind, DrawEventKind::Update);
        assert_eq!(events[0].features[0].exterior_ring()[0], [1.0, 2.0]);
    }

    #[test]
    fn test_move_vertex() {
        let mut surface = DrawSurface::new();
        let id = draw_square(&mut surface);

        surface.move_vertex(&id, 2, [2.0, 2.0]);
        assert_eq!(surface.features[0].exterior_ring()[2], [2.0, 2.0]);
    }

    #[test]
    fn test_trash_removes_selected() {
        let mut surface = DrawSurface::new();
        let id = draw_square(&mut surface);
        surface.take_events();

        assert_eq!(surface.trash(), Some(id.clone()));
        assert!(surface.features.is_empty());
        assert_eq!(surface.trash(), None);

        let events = surface.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DrawEventKind::Delete);
        assert_eq!(events[0].features[0].id, id);
    }

    #[test]
    fn test_shortcuts_ignored_while_field_has_focus() {
        let mut surface = DrawSurface::new();
        let id = draw_square(&mut surface);
        surface.take_events();
        let delete = Shortcuts {
            delete: true,
            ..Shortcuts::default()
        };

        surface.apply_shortcuts(delete, true);
        assert_eq!(surface.selected(), Some(id.as_str()));
        assert_eq!(surface.features.len(), 1);
        assert!(surface.take_events().is_empty());

        surface.apply_shortcuts(delete, false);
        assert!(surface.features.is_empty());
        assert_eq!(surface.take_events()[0].kind, DrawEventKind::Delete);
    }

    #[test]
    fn test_enter_finishes_ring_only_without_focus() {
        let mut surface = DrawSurface::new();
        surface.change_mode(DrawMode::DrawPolygon);
        for v in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]] {
            surface.add_vertex(v);
        }
        let enter = Shortcuts {
            finish: true,
            ..Shortcuts::default()
        };

        surface.apply_shortcuts(enter, true);
        assert_eq!(surface.pending().len(), 3);
        assert_eq!(surface.mode(), DrawMode::DrawPolygon);

        surface.apply_shortcuts(enter, false);
        assert!(surface.pending().is_empty());
        assert_eq!(surface.take_events()[0].kind, DrawEventKind::Create);
    }

    #[test]
    fn test_escape_cancels_ring() {
        let mut surface = DrawSurface::new();
        surface.change_mode(DrawMode::DrawPolygon);
        surface.add_vertex([0.0, 0.0]);

        let escape = Shortcuts {
            cancel: true,
            ..Shortcuts::default()
        };
        surface.apply_shortcuts(escape, false);
        assert!(surface.pending().is_empty());
        assert!(surface.take_events().is_empty());
    }
}
