use crate::config::AfcConfig;
use crate::gateway::{ErrorKind, ResError};
use crate::prelude::LatLng;
use crate::protocol::{FeatureCollection, InquiryResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Overlay drawn on the map. `version` increases whenever the map must redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MapOverlayState {
    pub val: FeatureCollection,
    pub valid: bool,
    pub version: u64,
}

impl MapOverlayState {
    /// Installs a freshly decoded overlay.
    pub fn replace(&mut self, collection: FeatureCollection) {
        self.val = collection;
        self.valid = true;
        self.version += 1;
    }

    /// Swaps the feature set without touching validity.
    pub fn set_features(&mut self, collection: FeatureCollection) {
        self.val = collection;
        self.version += 1;
    }

    pub fn touch(&mut self) {
        self.version += 1;
    }
}

/// Dismissible, non-fatal notice shown above the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub title: String,
    pub message: String,
}

impl Warning {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Map centre used before any request has been placed.
pub const DEFAULT_MAP_CENTER: LatLng = LatLng {
    lat: 40.0,
    lng: -100.0,
};

pub const CONFIG_LOAD_FAILURE: &str =
    "AFC config was not loaded properly. Try refreshing the page.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: RequestStatus,
    pub response: Option<InquiryResponse>,
    pub error: Option<ResError>,
    pub warning: Option<Warning>,
    pub min_eirp: f64,
    pub max_eirp: f64,
    pub map: MapOverlayState,
    pub map_center: Option<LatLng>,
    pub clicked_point: Option<LatLng>,
    pub include_map: bool,
    pub full_json_response: Option<String>,
    /// Decoded map archive of the last response. Not cached.
    #[serde(skip)]
    pub map_artifact: Option<Vec<u8>>,
}

impl ViewState {
    /// Initial state; `None` means the AFC config could not be loaded.
    pub fn from_config(config: Option<&AfcConfig>) -> Self {
        let base = Self {
            status: RequestStatus::Idle,
            response: None,
            error: None,
            warning: None,
            min_eirp: 0.0,
            max_eirp: 30.0,
            map: MapOverlayState::default(),
            map_center: Some(DEFAULT_MAP_CENTER),
            clicked_point: Some(DEFAULT_MAP_CENTER),
            include_map: false,
            full_json_response: None,
            map_artifact: None,
        };
        match config {
            Some(config) => Self {
                min_eirp: config.min_eirp,
                max_eirp: config.max_eirp,
                include_map: config.include_map(),
                ..base
            },
            None => Self {
                status: RequestStatus::Error,
                error: Some(ResError::new(ErrorKind::Parse, CONFIG_LOAD_FAILURE, None)),
                ..base
            },
        }
    }
}
