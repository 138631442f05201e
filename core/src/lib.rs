//! Core of the Rust AFC console.
//!
//! Holds the inquiry wire model, ellipse rasterization for the map overlay,
//! channel EIRP classification, the HTTP gateway that normalizes engine
//! replies, and the controller that owns console view state.

pub mod channels;
pub mod config;
pub mod controller;
pub mod gateway;
pub mod geometry;
pub mod math;
pub mod prelude;
pub mod protocol;
pub mod telemetry;

pub use config::AfcConfig;
pub use controller::{Completion, Controller, Submission};
pub use gateway::{GatewayResult, HttpGateway, ResError};
pub use prelude::{AfcError, AfcResult, LatLng};
