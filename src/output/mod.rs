//! Output formatting for CLI results

pub mod formatters;
pub mod generator;
pub mod json;
pub mod render;
pub mod table;

pub use generator::{DisplayConfig, Stats, generate};
pub use render::Vendor;
