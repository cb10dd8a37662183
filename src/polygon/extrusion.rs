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

//! Pseudo-3D painting of fill-extrusion layers.
//!
//! Each polygon is drawn as side walls between its footprint and a roof
//! raised by the extrusion height, with the roof triangulated by earcut.

use super::renderer::{Layer, LayerRegistry, MapRenderer};
use crate::map::MapView;
use egui::{Color32, Mesh, Painter, Pos2, Shape};
use geo::{LineString, Polygon, TriangulateEarcut};

/// Screen shading of walls relative to the roof color
const WALL_SHADE: f32 = 0.7;

/// Parse a CSS color name or `#rgb` / `#rrggbb` hex string
pub fn parse_color(color: &str, opacity: f64) -> Color32 {
    let (r, g, b) = match color.trim().to_ascii_lowercase().as_str() {
        "orange" => (255, 165, 0),
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        other => parse_hex(other).unwrap_or((128, 128, 128)),
    };
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |i: usize| channel(&hex[i..=i]).map(|c| c * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

fn shade(color: Color32, factor: f32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let scale = |c: u8| (f32::from(c) * factor).round() as u8;
    Color32::from_rgba_unmultiplied(scale(r), scale(g), scale(b), a)
}

/// Exterior rings of every polygon in a layer's source, as `[lon, lat]`
fn layer_rings(registry: &LayerRegistry, layer: &Layer) -> Vec<Vec<[f64; 2]>> {
    let Some(source) = registry.get_source(&layer.source) else {
        return Vec::new();
    };

    source
        .data()
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .filter_map(|g| match &g.value {
            geojson::Value::Polygon(rings) => rings.first(),
            _ => None,
        })
        .map(|ring| {
            let mut points: Vec<[f64; 2]> = ring
                .iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            points
        })
        .filter(|points| points.len() >= 3)
        .collect()
}

/// Roof triangles of a footprint in screen space
fn roof_triangles(footprint: &[Pos2]) -> Vec<[Pos2; 3]> {
    let coords: Vec<(f64, f64)> = footprint
        .iter()
        .map(|p| (f64::from(p.x), f64::from(p.y)))
        .collect();
    let polygon = Polygon::new(LineString::from(coords), Vec::new());

    polygon
        .earcut_triangles()
        .into_iter()
        .map(|t| t.to_array().map(|c| Pos2::new(c.x as f32, c.y as f32)))
        .collect()
}

fn extrusion_mesh(footprint: &[Pos2], lift: f32, base_lift: f32, color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    let wall_color = shade(color, WALL_SHADE);
    let raise = |p: Pos2, by: f32| Pos2::new(p.x, p.y - by);

    if lift > base_lift {
        for (i, &a) in footprint.iter().enumerate() {
            let b = footprint[(i + 1) % footprint.len()];
            let start = mesh.vertices.len() as u32;
            mesh.colored_vertex(raise(a, base_lift), wall_color);
            mesh.colored_vertex(raise(b, base_lift), wall_color);
            mesh.colored_vertex(raise(b, lift), wall_color);
            mesh.colored_vertex(raise(a, lift), wall_color);
            mesh.add_triangle(start, start + 1, start + 2);
            mesh.add_triangle(start, start + 2, start + 3);
        }
    }

    for triangle in roof_triangles(footprint) {
        let start = mesh.vertices.len() as u32;
        for p in triangle {
            mesh.colored_vertex(raise(p, lift), color);
        }
        mesh.add_triangle(start, start + 1, start + 2);
    }

    mesh
}

/// Paint every fill-extrusion layer in registration order
pub fn paint_layers(painter: &Painter, view: &MapView, registry: &LayerRegistry) {
    let pixels_per_meter = view.pixels_per_meter();

    for layer in registry.layers() {
        let color = parse_color(&layer.paint.color, layer.paint.opacity);
        let lift = layer.paint.height as f32 * pixels_per_meter;
        let base_lift = layer.paint.base as f32 * pixels_per_meter;

        for ring in layer_rings(registry, layer) {
            let footprint: Vec<Pos2> = ring.into_iter().map(|v| view.to_screen(v)).collect();
            painter.add(Shape::mesh(extrusion_mesh(&footprint, lift, base_lift, color)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex_colors() {
        assert_eq!(parse_color("orange", 1.0), Color32::from_rgb(255, 165, 0));
        assert_eq!(parse_color("White", 1.0), Color32::WHITE);
        assert_eq!(parse_color("#102030", 1.0), Color32::from_rgb(16, 32, 48));
        assert_eq!(parse_color("#fff", 1.0), Color32::WHITE);
        assert_eq!(parse_color("not-a-color", 1.0), Color32::from_rgb(128, 128, 128));
    }

    #[test]
    fn test_non_ascii_hex_falls_back_to_gray() {
        assert_eq!(parse_hex("#aébcd"), None);
        assert_eq!(parse_color("#éé", 1.0), Color32::from_rgb(128, 128, 128));
    }

    #[test]
    fn test_square_roof_has_two_triangles() {
        let footprint = [
            Pos2::new(0.0, 0.0),
            Pos2::new(10.0, 0.0),
            Pos2::new(10.0, 10.0),
            Pos2::new(0.0, 10.0),
        ];
        assert_eq!(roof_triangles(&footprint).len(), 2);
    }

    #[test]
    fn test_flat_extrusion_has_no_walls() {
        let footprint = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(5.0, 8.0)];

        let flat = extrusion_mesh(&footprint, 0.0, 0.0, Color32::WHITE);
        assert_eq!(flat.indices.len(), 3);

        let raised = extrusion_mesh(&footprint, 20.0, 0.0, Color32::WHITE);
        assert_eq!(raised.indices.len(), 3 + 3 * 6);
    }
}
