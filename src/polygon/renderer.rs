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

//! Map renderer source and layer registry.
//!
//! Sources hold GeoJSON data; layers reference a source by id and carry the
//! paint parameters used to draw it. The [`MapRenderer`] trait is the
//! contract the feature sync is written against, and [`LayerRegistry`] is the
//! in-memory implementation the editor paints from.

use log::debug;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by renderer registry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RendererError {
    #[error("source '{0}' already exists")]
    DuplicateSource(String),

    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("layer '{0}' does not exist")]
    LayerNotFound(String),

    #[error("source '{0}' does not exist")]
    SourceNotFound(String),
}

/// GeoJSON data source
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonSource {
    data: geojson::FeatureCollection,
}

impl GeoJsonSource {
    pub fn new(data: geojson::FeatureCollection) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &geojson::FeatureCollection {
        &self.data
    }

    /// Replace the source data in place
    pub fn set_data(&mut self, data: geojson::FeatureCollection) {
        self.data = data;
    }
}

/// Kind of visual layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Filled polygons extruded into 3-D volumes
    FillExtrusion,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FillExtrusion => "fill-extrusion",
        }
    }
}

/// Paint parameters of a fill-extrusion layer
#[derive(Debug, Clone, PartialEq)]
pub struct FillExtrusionPaint {
    /// CSS color name or hex string
    pub color: String,
    /// Extrusion height in meters
    pub height: f64,
    /// Extrusion base in meters
    pub base: f64,
    /// Opacity in 0.0 - 1.0
    pub opacity: f64,
}

/// Single paint property update
#[derive(Debug, Clone, PartialEq)]
pub enum PaintProperty {
    FillExtrusionColor(String),
    FillExtrusionHeight(f64),
}

impl PaintProperty {
    /// Style-spec key of the property
    pub fn key(&self) -> &'static str {
        match self {
            Self::FillExtrusionColor(_) => "fill-extrusion-color",
            Self::FillExtrusionHeight(_) => "fill-extrusion-height",
        }
    }
}

/// Visual layer drawn from a source
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: FillExtrusionPaint,
}

impl Layer {
    fn apply(&mut self, property: PaintProperty) {
        match property {
            PaintProperty::FillExtrusionColor(color) => self.paint.color = color,
            PaintProperty::FillExtrusionHeight(height) => self.paint.height = height,
        }
    }
}

/// Source and layer registry of a map renderer
pub trait MapRenderer {
    /// Register a source. Fails if the id is taken.
    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<(), RendererError>;

    /// Register a layer on top of the existing ones. Fails if the id is taken
    /// or the referenced source does not exist.
    fn add_layer(&mut self, layer: Layer) -> Result<(), RendererError>;

    /// Remove a layer. Its source stays registered.
    fn remove_layer(&mut self, id: &str) -> Result<(), RendererError>;

    fn get_source(&self, id: &str) -> Option<&GeoJsonSource>;

    fn get_source_mut(&mut self, id: &str) -> Option<&mut GeoJsonSource>;

    fn get_layer(&self, id: &str) -> Option<&Layer>;

    fn set_paint_property(&mut self, id: &str, property: PaintProperty) -> Result<(), RendererError>;
}

/// In-memory renderer registry. Layers keep insertion order, which is also
/// their paint order (first is bottom-most).
#[derive(Debug, Default)]
pub struct LayerRegistry {
    sources: HashMap<String, GeoJsonSource>,
    layers: Vec<Layer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers in paint order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl MapRenderer for LayerRegistry {
    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<(), RendererError> {
        if self.sources.contains_key(id) {
            return Err(RendererError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn add_layer(&mut self, layer: Layer) -> Result<(), RendererError> {
        if self.get_layer(&layer.id).is_some() {
            return Err(RendererError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(RendererError::SourceNotFound(layer.source));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), RendererError> {
        let pos = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| RendererError::LayerNotFound(id.to_string()))?;
        self.layers.remove(pos);
        Ok(())
    }

    fn get_source(&self, id: &str) -> Option<&GeoJsonSource> {
        self.sources.get(id)
    }

    fn get_source_mut(&mut self, id: &str) -> Option<&mut GeoJsonSource> {
        self.sources.get_mut(id)
    }

    fn get_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn set_paint_property(&mut self, id: &str, property: PaintProperty) -> Result<(), RendererError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RendererError::LayerNotFound(id.to_string()))?;
        debug!("Setting {} on layer {id}", property.key());
        layer.apply(property);
        Ok(())
    }
}
