pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean of a set of `[x, y]` pairs.
    pub fn centroid(points: &[[f64; 2]]) -> Option<[f64; 2]> {
        if points.is_empty() {
            return None;
        }
        let count = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
        Some([sx / count, sy / count])
    }
}
