use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Position = [f64; 2];

/// GeoJSON geometry subset emitted by AFC map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub tag: FeatureTag,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry,
        }
    }

    /// The `kind` property used to pick a drawing style.
    pub fn kind(&self) -> Option<&str> {
        self.properties.get("kind").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollectionTag {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub tag: CollectionTag,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mixed_feature_collection() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"kind": "BLDB"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [2.0, 2.0]]}}
            ]
        });
        let collection: FeatureCollection = serde_json::from_value(raw).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].kind(), Some("BLDB"));
        assert!(matches!(
            collection.features[1].geometry,
            Geometry::LineString { .. }
        ));
    }

    #[test]
    fn empty_collection_serializes_type_tag() {
        let value = serde_json::to_value(FeatureCollection::empty()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"], json!([]));
    }
}
