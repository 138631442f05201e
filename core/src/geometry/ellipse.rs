use crate::math::GeoHelper;
use crate::protocol::{Ellipse, Position};
use std::f64::consts::PI;

/// Sample count used when drawing a device ellipse on the map.
pub const ELLIPSE_RASTER_SAMPLES: usize = 32;

/// Approximates the boundary of `ellipse` with a closed ring of `samples + 1`
/// `[lng, lat]` positions. The first and last positions coincide.
///
/// Zero-length axes collapse the ring onto the centre. `samples == 0` yields
/// an empty ring.
pub fn rasterize_ellipse(ellipse: &Ellipse, samples: usize) -> Vec<Position> {
    if samples == 0 {
        return Vec::new();
    }
    let omega = 2.0 * PI / samples as f64;
    let theta = ellipse.orientation.to_radians();
    let center = ellipse.center;

    (0..=samples)
        .map(|i| {
            let alpha = omega * i as f64;
            let offset = [
                ellipse.major_axis * alpha.sin(),
                ellipse.minor_axis * alpha.cos(),
            ];
            let rotated = GeoHelper::rotate(offset, theta);
            let [d_lng, d_lat] = GeoHelper::meter_offset_to_deg(rotated, center.latitude);
            [center.longitude + d_lng, center.latitude + d_lat]
        })
        .collect()
}

/// Largest distance in metres between the ring's edge midpoints and the
/// exact ellipse boundary at the same parameter angle.
pub fn max_boundary_deviation(ellipse: &Ellipse, ring: &[Position]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    let samples = ring.len() - 1;
    let exact = rasterize_ellipse(ellipse, samples * 2);
    ring.windows(2)
        .enumerate()
        .map(|(i, edge)| {
            let mid = [
                (edge[0][0] + edge[1][0]) / 2.0,
                (edge[0][1] + edge[1][1]) / 2.0,
            ];
            let on_curve = exact[2 * i + 1];
            let [dx, dy] = GeoHelper::deg_offset_to_meter(
                [mid[0] - on_curve[0], mid[1] - on_curve[1]],
                ellipse.center.latitude,
            );
            dx.hypot(dy)
        })
        .fold(0.0, f64::max)
}
