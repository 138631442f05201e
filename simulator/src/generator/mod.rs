pub mod map;
pub mod profile;
