/// WGS-84 equatorial radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Flat-earth helpers for small offsets around a reference point.
pub struct GeoHelper;

impl GeoHelper {
    /// Rotates an `[x, y]` offset counter-clockwise by `theta` radians.
    pub fn rotate([x, y]: [f64; 2], theta: f64) -> [f64; 2] {
        let (sin, cos) = theta.sin_cos();
        [x * cos - y * sin, x * sin + y * cos]
    }

    /// Converts an east/north metre offset into a `[d_lng, d_lat]` degree
    /// offset at the given latitude.
    pub fn meter_offset_to_deg([dx, dy]: [f64; 2], latitude: f64) -> [f64; 2] {
        let d_lat = (dy / EARTH_RADIUS_M).to_degrees();
        let d_lng = (dx / (EARTH_RADIUS_M * latitude.to_radians().cos())).to_degrees();
        [d_lng, d_lat]
    }

    /// Inverse of [`GeoHelper::meter_offset_to_deg`].
    pub fn deg_offset_to_meter([d_lng, d_lat]: [f64; 2], latitude: f64) -> [f64; 2] {
        let dy = d_lat.to_radians() * EARTH_RADIUS_M;
        let dx = d_lng.to_radians() * EARTH_RADIUS_M * latitude.to_radians().cos();
        [dx, dy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_maps_east_to_north() {
        let [x, y] = GeoHelper::rotate([1.0, 0.0], std::f64::consts::FRAC_PI_2);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn longitude_offsets_grow_with_latitude() {
        let [equator, _] = GeoHelper::meter_offset_to_deg([1000.0, 0.0], 0.0);
        let [north, _] = GeoHelper::meter_offset_to_deg([1000.0, 0.0], 60.0);
        assert!((north / equator - 2.0).abs() < 1e-9);
    }

    #[test]
    fn metre_conversion_inverts() {
        let deg = GeoHelper::meter_offset_to_deg([120.0, -45.0], 41.0);
        let [dx, dy] = GeoHelper::deg_offset_to_meter(deg, 41.0);
        assert!((dx - 120.0).abs() < 1e-6);
        assert!((dy + 45.0).abs() < 1e-6);
    }
}
