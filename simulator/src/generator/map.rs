use afccore::prelude::LatLng;
use afccore::protocol::{Feature, FeatureCollection, Geometry, VendorExtension, MAP_INFO_EXTENSION_ID};
use anyhow::Context;
use base64::Engine as _;
use flate2::{write::GzEncoder, Compression};
use serde_json::{json, Map, Value};
use std::io::Write;

/// Half-width in degrees of the building box drawn around the device.
const BUILDING_HALF_SPAN_DEG: f64 = 0.002;

fn building_box(center: LatLng) -> Feature {
    let (lat, lng, d) = (center.lat, center.lng, BUILDING_HALF_SPAN_DEG);
    let ring = vec![
        [lng - d, lat - d],
        [lng + d, lat - d],
        [lng + d, lat + d],
        [lng - d, lat + d],
        [lng - d, lat - d],
    ];
    let mut properties = Map::new();
    properties.insert("kind".into(), Value::String("BLDB".into()));
    Feature::new(
        Geometry::Polygon {
            coordinates: vec![ring],
        },
        properties,
    )
}

fn kml_document(request_id: &str, center: LatLng) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>"#,
            "<name>AFC results {}</name>",
            "<Placemark><name>RLAN</name><Point><coordinates>{},{},0</coordinates></Point></Placemark>",
            "</Document></kml>"
        ),
        request_id, center.lng, center.lat
    )
}

/// Gzip-compressed KML artifact, base64 encoded and wrapped at 76 columns.
pub fn encode_artifact(request_id: &str, center: LatLng) -> anyhow::Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(kml_document(request_id, center).as_bytes())
        .context("compressing KML artifact")?;
    let compressed = encoder.finish().context("finishing KML artifact")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(compressed);
    let lines: Vec<&str> = encoded
        .as_bytes()
        .chunks(76)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();
    Ok(lines.join("\n"))
}

/// `openAfc.mapinfo` extension for a device at `center`.
pub fn map_info_extension(request_id: &str, center: LatLng) -> anyhow::Result<VendorExtension> {
    let overlay = FeatureCollection {
        features: vec![building_box(center)],
        ..Default::default()
    };
    let geo_json_file = json!({ "geoJson": overlay }).to_string();
    Ok(VendorExtension::new(
        MAP_INFO_EXTENSION_ID,
        json!({
            "kmzFile": encode_artifact(request_id, center)?,
            "geoJsonFile": geo_json_file,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use afccore::protocol::VendorExtensions;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn extension_decodes_through_core_lookup() {
        let center = LatLng::new(41.0, -74.0);
        let extension = map_info_extension("req-1", center).unwrap();
        let info = VendorExtensions::index(&[extension])
            .map_info()
            .unwrap()
            .unwrap();

        let overlay = info.decode_overlay().unwrap().unwrap();
        assert_eq!(overlay.features[0].kind(), Some("BLDB"));

        let artifact = info.decode_artifact().unwrap().unwrap();
        let mut kml = String::new();
        GzDecoder::new(artifact.as_slice())
            .read_to_string(&mut kml)
            .unwrap();
        assert!(kml.contains("AFC results req-1"));
        assert!(kml.contains("-74,41,0"));
    }
}
