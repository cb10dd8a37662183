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

use geojson::JsonObject;

/// A drawn shape with a stable identifier.
///
/// The drawing surface owns the geometry; the feature sync only reads it and
/// rewrites the property bag on update.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: geojson::Geometry,
    pub properties: JsonObject,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: geojson::Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: JsonObject::new(),
        }
    }

    /// Polygon feature from a single exterior ring of `[lon, lat]` pairs.
    /// The ring is closed if the last position differs from the first.
    pub fn polygon(id: impl Into<String>, ring: &[[f64; 2]]) -> Self {
        let mut positions: Vec<Vec<f64>> = ring.iter().map(|p| p.to_vec()).collect();
        if let (Some(first), Some(last)) = (positions.first(), positions.last()) {
            if first != last {
                positions.push(first.clone());
            }
        }

        Self::new(
            id,
            geojson::Geometry::new(geojson::Value::Polygon(vec![positions])),
        )
    }

    /// Exterior ring as `[lon, lat]` pairs, without the closing position.
    /// Empty for non-polygon geometry.
    pub fn exterior_ring(&self) -> Vec<[f64; 2]> {
        let geojson::Value::Polygon(rings) = &self.geometry.value else {
            return Vec::new();
        };

        let Some(exterior) = rings.first() else {
            return Vec::new();
        };

        let mut ring: Vec<[f64; 2]> = exterior
            .iter()
            .filter(|p| p.len() >= 2)
            .map(|p| [p[0], p[1]])
            .collect();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }
}

impl From<&Feature> for geojson::Feature {
    fn from(feature: &Feature) -> Self {
        geojson::Feature {
            bbox: None,
            geometry: Some(feature.geometry.clone()),
            id: Some(geojson::feature::Id::String(feature.id.clone())),
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        }
    }
}

/// Feature collection holding exactly the given features, in order
pub fn feature_collection<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: features.into_iter().map(geojson::Feature::from).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_ring_is_closed() {
        let feature = Feature::polygon("a", &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        let geojson::Value::Polygon(rings) = &feature.geometry.value else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][0], rings[0][3]);
        assert_eq!(feature.exterior_ring().len(), 3);
    }

    #[test]
    fn test_geojson_conversion_keeps_id() {
        let feature = Feature::polygon("abc", &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        let converted = geojson::Feature::from(&feature);
        assert_eq!(
            converted.id,
            Some(geojson::feature::Id::String("abc".to_string()))
        );
        assert_eq!(feature_collection([&feature]).features.len(), 1);
    }
}
