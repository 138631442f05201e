use crate::prelude::{AfcError, AfcResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Subset of the AFC engine configuration the console reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfcConfig {
    #[serde(rename = "minEIRP")]
    pub min_eirp: f64,
    #[serde(rename = "maxEIRP")]
    pub max_eirp: f64,
    #[serde(rename = "enableMapInVirtualAp", default)]
    pub enable_map_in_virtual_ap: Option<bool>,
}

impl Default for AfcConfig {
    fn default() -> Self {
        Self {
            min_eirp: 18.0,
            max_eirp: 36.0,
            enable_map_in_virtual_ap: Some(false),
        }
    }
}

impl AfcConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> AfcResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| AfcError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| AfcError::Json {
            what: format!("AFC config {}", path_ref.display()),
            source,
        })
    }

    pub fn include_map(&self) -> bool {
        self.enable_map_in_virtual_ap.unwrap_or(false)
    }
}
