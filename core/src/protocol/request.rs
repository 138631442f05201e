use super::extension::VendorExtension;
use crate::math::StatsHelper;
use crate::prelude::{AfcError, AfcResult, LatLng};
use serde::{Deserialize, Serialize};

/// Geographic point as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Ellipse location: axes in metres, orientation in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub center: Point,
    pub major_axis: f64,
    pub minor_axis: f64,
    pub orientation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearPolygon {
    pub outer_boundary: Vec<Point>,
}

/// Boundary vertex of a radial polygon, relative to its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub length: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialPolygon {
    pub center: Point,
    pub outer_boundary: Vec<Vector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elevation {
    pub height: f64,
    pub vertical_uncertainty: f64,
    pub height_type: String,
}

impl Default for Elevation {
    fn default() -> Self {
        Self {
            height: 15.0,
            vertical_uncertainty: 5.0,
            height_type: "AGL".into(),
        }
    }
}

/// Borrowed view over whichever location shape a request carries.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Ellipse(&'a Ellipse),
    LinearPolygon(&'a LinearPolygon),
    RadialPolygon(&'a RadialPolygon),
}

impl Shape<'_> {
    /// Representative point used to place the map marker.
    pub fn representative_point(&self) -> Option<LatLng> {
        match self {
            Shape::Ellipse(ellipse) => Some(LatLng::new(
                ellipse.center.latitude,
                ellipse.center.longitude,
            )),
            Shape::LinearPolygon(polygon) => {
                let vertices: Vec<[f64; 2]> = polygon
                    .outer_boundary
                    .iter()
                    .map(|p| [p.latitude, p.longitude])
                    .collect();
                StatsHelper::centroid(&vertices).map(|[lat, lng]| LatLng::new(lat, lng))
            }
            Shape::RadialPolygon(polygon) => Some(LatLng::new(
                polygon.center.latitude,
                polygon.center.longitude,
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Ellipse(_) => "ellipse",
            Shape::LinearPolygon(_) => "linearPolygon",
            Shape::RadialPolygon(_) => "radialPolygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ellipse: Option<Ellipse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_polygon: Option<LinearPolygon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radial_polygon: Option<RadialPolygon>,
    #[serde(default)]
    pub elevation: Elevation,
    #[serde(default)]
    pub indoor_deployment: u8,
}

impl Location {
    pub fn from_ellipse(ellipse: Ellipse) -> Self {
        Self {
            ellipse: Some(ellipse),
            ..Default::default()
        }
    }

    pub fn from_linear_polygon(polygon: LinearPolygon) -> Self {
        Self {
            linear_polygon: Some(polygon),
            ..Default::default()
        }
    }

    pub fn from_radial_polygon(polygon: RadialPolygon) -> Self {
        Self {
            radial_polygon: Some(polygon),
            ..Default::default()
        }
    }

    /// All populated shapes, in wire order.
    pub fn shapes(&self) -> Vec<Shape<'_>> {
        let mut shapes = Vec::with_capacity(1);
        if let Some(ellipse) = &self.ellipse {
            shapes.push(Shape::Ellipse(ellipse));
        }
        if let Some(polygon) = &self.linear_polygon {
            shapes.push(Shape::LinearPolygon(polygon));
        }
        if let Some(polygon) = &self.radial_polygon {
            shapes.push(Shape::RadialPolygon(polygon));
        }
        shapes
    }

    /// The single populated shape, `None` when the location carries none.
    pub fn shape(&self) -> Option<Shape<'_>> {
        self.shapes().into_iter().next()
    }

    /// At most one shape may be populated.
    pub fn validate(&self) -> AfcResult<()> {
        let shapes = self.shapes();
        if shapes.len() > 1 {
            let names: Vec<_> = shapes.iter().map(Shape::name).collect();
            return Err(AfcError::InvalidLocation(format!(
                "expected one location shape, found {}",
                names.join(", ")
            )));
        }
        Ok(())
    }

    pub fn representative_point(&self) -> Option<LatLng> {
        self.shape().and_then(|shape| shape.representative_point())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationId {
    pub nra: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub serial_number: String,
    #[serde(default)]
    pub certification_id: Vec<CertificationId>,
    #[serde(default)]
    pub ruleset_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiredChannel {
    pub global_operating_class: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_cfi: Option<Vec<u32>>,
}

/// Frequency span in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRange {
    pub low_frequency: u64,
    pub high_frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub request_id: String,
    pub device_descriptor: DeviceDescriptor,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_desired_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendor_extensions: Vec<VendorExtension>,
    #[serde(default)]
    pub inquired_channels: Vec<InquiredChannel>,
    #[serde(default)]
    pub inquired_frequency_range: Vec<FrequencyRange>,
}

pub const DEFAULT_RULESET: &str = "US_47_CFR_PART_15_SUBPART_E";

impl InquiryRequest {
    /// Ready-made request used by the console form and the offline driver.
    pub fn sample() -> Self {
        Self {
            request_id: "0".into(),
            device_descriptor: DeviceDescriptor {
                serial_number: "sample-ap".into(),
                certification_id: vec![CertificationId {
                    nra: "FCC".into(),
                    id: "1234567890".into(),
                }],
                ruleset_ids: vec![DEFAULT_RULESET.into()],
            },
            location: Location {
                elevation: Elevation::default(),
                indoor_deployment: 1,
                ..Location::from_ellipse(Ellipse {
                    center: Point::new(41.0, -74.0),
                    major_axis: 200.0,
                    minor_axis: 100.0,
                    orientation: 90.0,
                })
            },
            min_desired_power: Some(15.0),
            vendor_extensions: Vec::new(),
            inquired_channels: vec![
                InquiredChannel {
                    global_operating_class: 133,
                    channel_cfi: None,
                },
                InquiredChannel {
                    global_operating_class: 134,
                    channel_cfi: Some(vec![15, 47, 79]),
                },
            ],
            inquired_frequency_range: vec![FrequencyRange {
                low_frequency: 5_925_000_000,
                high_frequency: 6_425_000_000,
            }],
        }
    }
}
