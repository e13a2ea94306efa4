pub mod errors;
pub mod formats;
pub mod model;
pub mod naming;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use model::{ParsedGeometry, Sensor, SensorSet, SensorSetError, Volume};
pub use naming::canonical_name;
pub use registry::{parse_geometry_file, parse_geometry_path, parse_with_parsers, GeometryParser};
