//! Wire model of the available spectrum inquiry exchange.

pub mod extension;
pub mod geojson;
pub mod request;
pub mod response;

pub use extension::{MapInfo, VendorExtension, VendorExtensions, MAP_INFO_EXTENSION_ID};
pub use geojson::{Feature, FeatureCollection, Geometry, Position};
pub use request::{
    CertificationId, DeviceDescriptor, Ellipse, Elevation, FrequencyRange, InquiredChannel,
    InquiryRequest, LinearPolygon, Location, Point, RadialPolygon, Shape, Vector,
    DEFAULT_RULESET,
};
pub use response::{
    AvailableChannelInfo, AvailableFrequencyInfo, InquiryResponse, ResponseCode, ResponseStatus,
};
