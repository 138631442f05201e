use std::path::PathBuf;

/// Common error type for the library surface.
#[derive(thiserror::Error, Debug)]
pub enum AfcError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("session storage: {0}")]
    Storage(String),
    #[error("map info: {0}")]
    MapInfo(String),
}

pub type AfcResult<T> = Result<T, AfcError>;

/// Latitude/longitude pair used for map centring and markers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}
