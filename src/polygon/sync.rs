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

//! Feature lifecycle synchronization.
//!
//! Keeps one fill-extrusion layer per drawn feature in step with the drawing
//! surface:
//!
//! - create: register a source holding the feature and an orange layer on it
//! - update: rewrite the feature properties, replace the source data, and
//!   repaint the layer white at the current height
//! - delete: remove the layer; the source stays registered
//!
//! The only state held here is the shared [`HeightControl`], read at the
//! moment each event is applied.

use super::draw::{DrawEvent, DrawEventKind};
use super::feature::{feature_collection, Feature};
use super::renderer::{
    FillExtrusionPaint, GeoJsonSource, Layer, LayerKind, MapRenderer, PaintProperty,
    RendererError,
};
use geojson::JsonObject;
use log::{debug, info};
use serde_json::json;
use thiserror::Error;

/// Fill color of a freshly created layer
pub const CREATED_COLOR: &str = "orange";

/// Fill color of a layer after any update
pub const UPDATED_COLOR: &str = "white";

/// Errors raised while applying drawing events
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{0} event carried no features")]
    MissingSubject(DrawEventKind),

    #[error(transparent)]
    Renderer(#[from] RendererError),
}

/// Shared extrusion height form control
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightControl {
    /// Height in meters applied to the next created or updated feature
    pub value: f64,
    /// Whether the control is collapsed in the UI
    pub hidden: bool,
}

impl HeightControl {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            hidden: false,
        }
    }
}

/// Applies drawing-surface events to a [`MapRenderer`]
#[derive(Debug, Default)]
pub struct FeatureSync {
    height: HeightControl,
}

impl FeatureSync {
    pub fn new(height: HeightControl) -> Self {
        Self { height }
    }

    pub fn height(&self) -> &HeightControl {
        &self.height
    }

    pub fn height_mut(&mut self) -> &mut HeightControl {
        &mut self.height
    }

    /// Register a source and an extrusion layer for a new feature.
    ///
    /// A source left behind by an earlier delete of the same id is re-pointed
    /// at the new geometry instead of being registered twice. Fails without
    /// touching the registry if a layer with the id already exists.
    pub fn on_create<R: MapRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        feature: &Feature,
    ) -> Result<(), SyncError> {
        let id = feature.id.as_str();
        if renderer.get_layer(id).is_some() {
            return Err(RendererError::DuplicateLayer(id.to_string()).into());
        }

        let data = feature_collection([feature]);
        match renderer.get_source_mut(id) {
            Some(source) => {
                debug!("Reusing retained source for feature {id}");
                source.set_data(data);
            }
            None => renderer.add_source(id, GeoJsonSource::new(data))?,
        }

        let layer = Layer {
            id: id.to_string(),
            kind: LayerKind::FillExtrusion,
            source: id.to_string(),
            paint: FillExtrusionPaint {
                color: CREATED_COLOR.to_string(),
                height: self.height.value,
                base: 0.0,
                opacity: 1.0,
            },
        };
        renderer.add_layer(layer)?;

        info!(
            "Created {} layer for feature {id} at {} m",
            LayerKind::FillExtrusion.as_str(),
            self.height.value
        );
        Ok(())
    }

    /// Refresh the source data and paint of an existing feature.
    ///
    /// The feature's property bag is overwritten with the current height and
    /// the update color before it is written to the source.
    pub fn on_update<R: MapRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        feature: &mut Feature,
    ) -> Result<(), SyncError> {
        let height = self.height.value;

        let mut properties = JsonObject::new();
        properties.insert("height".to_string(), json!(height));
        properties.insert("base_height".to_string(), json!(0));
        properties.insert("color".to_string(), json!(UPDATED_COLOR));
        feature.properties = properties;

        let id = feature.id.as_str();
        let data = feature_collection([&*feature]);
        renderer
            .get_source_mut(id)
            .ok_or_else(|| RendererError::SourceNotFound(id.to_string()))?
            .set_data(data);

        renderer.set_paint_property(id, PaintProperty::FillExtrusionHeight(height))?;
        renderer.set_paint_property(
            id,
            PaintProperty::FillExtrusionColor(UPDATED_COLOR.to_string()),
        )?;

        debug!("Updated feature {id} to {height} m");
        Ok(())
    }

    /// Remove the layer of a deleted feature. The source is retained.
    pub fn on_delete<R: MapRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        feature: &Feature,
    ) -> Result<(), SyncError> {
        renderer.remove_layer(&feature.id)?;
        info!("Removed layer for feature {}", feature.id);
        Ok(())
    }

    /// Apply a batched drawing event one feature at a time.
    ///
    /// Returns the features as they were applied, which for updates includes
    /// the rewritten property bags.
    pub fn handle_event<R: MapRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        event: DrawEvent,
    ) -> Result<Vec<Feature>, SyncError> {
        let DrawEvent { kind, mut features } = event;
        if features.is_empty() {
            return Err(SyncError::MissingSubject(kind));
        }

        for feature in &mut features {
            match kind {
                DrawEventKind::Create => self.on_create(renderer, feature)?,
                DrawEventKind::Update => self.on_update(renderer, feature)?,
                DrawEventKind::Delete => self.on_delete(renderer, feature)?,
            }
        }

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::renderer::LayerRegistry;

    fn square(id: &str, size: f64) -> Feature {
        Feature::polygon(id, &[[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]])
    }

    fn source_features(registry: &LayerRegistry, id: &str) -> Vec<geojson::Feature> {
        registry.get_source(id).unwrap().data().features.clone()
    }

    #[test]
    fn test_full_lifecycle() {
        let mut registry = LayerRegistry::new();
        let mut sync = FeatureSync::new(HeightControl::new(10.0));

        let created = square("f1", 1.0);
        sync.on_create(&mut registry, &created).unwrap();
        let layer = registry.get_layer("f1").unwrap();
        assert_eq!(layer.paint.color, "orange");
        assert_eq!(layer.paint.height, 10.0);
        assert_eq!(layer.paint.base, 0.0);
        assert_eq!(layer.paint.opacity, 1.0);
        assert_eq!(
            source_features(&registry, "f1"),
            vec![geojson::Feature::from(&created)]
        );

        for height in [25.0, 40.0] {
            sync.height_mut().value = height;
            let applied = sync
                .handle_event(
                    &mut registry,
                    DrawEvent::new(DrawEventKind::Update, vec![square("f1", height)]),
                )
                .unwrap();

            let expected: Vec<geojson::Feature> =
                applied.iter().map(geojson::Feature::from).collect();
            assert_eq!(source_features(&registry, "f1"), expected);
            let layer = registry.get_layer("f1").unwrap();
            assert_eq!(layer.paint.height, height);
            assert_eq!(layer.paint.color, "white");
        }

        sync.on_delete(&mut registry, &square("f1", 1.0)).unwrap();
        assert!(registry.get_layer("f1").is_none());
        assert!(registry.get_source("f1").is_some());
    }

    #[test]
    fn test_update_rewrites_properties() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::new(HeightControl::new(12.5));
        let mut feature = square("f1", 1.0);
        feature
            .properties
            .insert("user_note".to_string(), json!("north wing"));

        sync.on_create(&mut registry, &feature).unwrap();
        sync.on_update(&mut registry, &mut feature).unwrap();

        assert_eq!(feature.properties.len(), 3);
        assert_eq!(feature.properties["height"], json!(12.5));
        assert_eq!(feature.properties["base_height"], json!(0));
        assert_eq!(feature.properties["color"], json!("white"));
    }

    #[test]
    fn test_update_without_touching_height_still_whitens() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::default();
        let mut feature = square("f1", 1.0);

        sync.on_create(&mut registry, &feature).unwrap();
        sync.on_update(&mut registry, &mut feature).unwrap();
        assert_eq!(registry.get_layer("f1").unwrap().paint.color, "white");
    }

    #[test]
    fn test_height_is_not_retroactive() {
        let mut registry = LayerRegistry::new();
        let mut sync = FeatureSync::new(HeightControl::new(5.0));

        sync.on_create(&mut registry, &square("a", 1.0)).unwrap();
        sync.height_mut().value = 50.0;
        sync.on_create(&mut registry, &square("b", 1.0)).unwrap();

        assert_eq!(registry.get_layer("a").unwrap().paint.height, 5.0);
        assert_eq!(registry.get_layer("b").unwrap().paint.height, 50.0);
    }

    #[test]
    fn test_delete_unknown_layer_fails() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::default();

        assert_eq!(
            sync.on_delete(&mut registry, &square("ghost", 1.0)),
            Err(SyncError::Renderer(RendererError::LayerNotFound(
                "ghost".to_string()
            )))
        );
    }

    #[test]
    fn test_empty_event_is_invariant_violation() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::default();

        assert_eq!(
            sync.handle_event(&mut registry, DrawEvent::new(DrawEventKind::Update, Vec::new())),
            Err(SyncError::MissingSubject(DrawEventKind::Update))
        );
    }

    #[test]
    fn test_recreate_after_delete_reuses_source() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::default();

        sync.on_create(&mut registry, &square("f1", 1.0)).unwrap();
        sync.on_delete(&mut registry, &square("f1", 1.0)).unwrap();

        let replacement = square("f1", 3.0);
        sync.on_create(&mut registry, &replacement).unwrap();

        assert_eq!(registry.source_count(), 1);
        assert!(registry.get_layer("f1").is_some());
        assert_eq!(
            source_features(&registry, "f1"),
            vec![geojson::Feature::from(&replacement)]
        );
    }

    #[test]
    fn test_batched_create_registers_every_feature() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::default();

        sync.handle_event(
            &mut registry,
            DrawEvent::new(DrawEventKind::Create, vec![square("a", 1.0), square("b", 2.0)]),
        )
        .unwrap();

        assert_eq!(registry.layers().len(), 2);
    }

    #[test]
    fn test_create_over_live_layer_leaves_registry_unchanged() {
        let mut registry = LayerRegistry::new();
        let sync = FeatureSync::new(HeightControl::new(10.0));

        let original = square("f1", 1.0);
        sync.on_create(&mut registry, &original).unwrap();

        let moved = Feature::polygon("f1", &[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]]);
        assert_eq!(
            sync.on_create(&mut registry, &moved),
            Err(SyncError::Renderer(RendererError::DuplicateLayer(
                "f1".to_string()
            )))
        );

        assert_eq!(
            source_features(&registry, "f1"),
            vec![geojson::Feature::from(&original)]
        );
        assert_eq!(registry.layers().len(), 1);
        assert_eq!(registry.get_layer("f1").unwrap().paint.color, "orange");
    }
}
