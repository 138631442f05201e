pub mod geo;
pub mod stats;

pub use geo::GeoHelper;
pub use stats::StatsHelper;
