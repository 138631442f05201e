use super::geojson::FeatureCollection;
use crate::prelude::{AfcError, AfcResult};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identifier of the map artifact extension attached by the AFC engine.
pub const MAP_INFO_EXTENSION_ID: &str = "openAfc.mapinfo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorExtension {
    #[serde(rename = "extensionId", alias = "extensionID")]
    pub extension_id: String,
    #[serde(default)]
    pub parameters: Value,
}

impl VendorExtension {
    pub fn new(extension_id: impl Into<String>, parameters: Value) -> Self {
        Self {
            extension_id: extension_id.into(),
            parameters,
        }
    }
}

/// Extensions of one response indexed by identifier. Later duplicates win.
#[derive(Debug, Clone, Default)]
pub struct VendorExtensions {
    by_id: BTreeMap<String, Value>,
}

impl VendorExtensions {
    pub fn index(extensions: &[VendorExtension]) -> Self {
        let by_id = extensions
            .iter()
            .map(|ext| (ext.extension_id.clone(), ext.parameters.clone()))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, extension_id: &str) -> Option<&Value> {
        self.by_id.get(extension_id)
    }

    pub fn map_info(&self) -> AfcResult<Option<MapInfo>> {
        match self.get(MAP_INFO_EXTENSION_ID) {
            Some(params) => serde_json::from_value(params.clone())
                .map(Some)
                .map_err(|source| AfcError::Json {
                    what: MAP_INFO_EXTENSION_ID.into(),
                    source,
                }),
            None => Ok(None),
        }
    }
}

/// Parameters of the `openAfc.mapinfo` extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    /// Base64 KMZ archive.
    #[serde(default)]
    pub kmz_file: Option<String>,
    /// JSON text of the form `{"geoJson": FeatureCollection}`.
    #[serde(default)]
    pub geo_json_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoJsonFile {
    geo_json: Option<FeatureCollection>,
}

impl MapInfo {
    pub fn decode_artifact(&self) -> AfcResult<Option<Vec<u8>>> {
        let Some(encoded) = &self.kmz_file else {
            return Ok(None);
        };
        // the engine wraps base64 output at 76 columns
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map(Some)
            .map_err(|err| AfcError::MapInfo(format!("kmzFile is not base64: {err}")))
    }

    pub fn decode_overlay(&self) -> AfcResult<Option<FeatureCollection>> {
        let Some(text) = &self.geo_json_file else {
            return Ok(None);
        };
        let file: GeoJsonFile = serde_json::from_str(text).map_err(|source| AfcError::Json {
            what: "geoJsonFile".into(),
            source,
        })?;
        Ok(file.geo_json)
    }
}
