pub mod ellipse;

pub use ellipse::{max_boundary_deviation, rasterize_ellipse, ELLIPSE_RASTER_SAMPLES};
