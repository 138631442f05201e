//! Channel taxonomy of the 6 GHz band and EIRP colour classification.

pub mod classify;
pub mod taxonomy;

pub use classify::{channel_color, classify_channels};
pub use taxonomy::{
    default_ranges, empty_channels, operating_class_channels, Channel, ChannelColor,
    ChannelGroup, FreqRange,
};
