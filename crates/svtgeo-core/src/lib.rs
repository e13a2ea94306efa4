pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod relative;
pub mod tables;

pub use config::{DetectorEntry, RunConfig, VolumeSchemas};
pub use detector::Detector;
pub use error::{GeometryError, Result};
