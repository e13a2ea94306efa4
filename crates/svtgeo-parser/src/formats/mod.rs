mod common;
mod geo_dump;

pub use geo_dump::GeoDumpParser;

pub(crate) use common::{parse_required_f64, split_position_list, split_sensor_line};
