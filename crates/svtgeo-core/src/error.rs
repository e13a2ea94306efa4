// crates/svtgeo-core/src/error.rs

use std::path::PathBuf;

use svtgeo_parser::{ParserError, Volume};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Geometry parsing failed: {0}")]
    Parser(#[from] ParserError),

    #[error("File I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error for '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Configuration TOML is invalid: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration could not be serialized: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration is invalid: {0}")]
    Config(String),

    #[error("reference sensor '{reference}' for year {year} ({volume}) is missing from detector '{detector}'")]
    MissingReference {
        detector: String,
        reference: String,
        year: i32,
        volume: Volume,
    },

    #[error("detector '{detector}' has no sensor '{sensor}' required by the {volume} schema")]
    MissingSensor {
        detector: String,
        sensor: String,
        volume: Volume,
    },

    #[error("detector '{detector}' has sensor '{sensor}' which is not part of the {volume} schema")]
    UnexpectedSensor {
        detector: String,
        sensor: String,
        volume: Volume,
    },

    #[error("detector '{detector}' fills {found} {volume} columns but the schema has {expected}")]
    ColumnMismatch {
        detector: String,
        volume: Volume,
        expected: usize,
        found: usize,
    },

    #[error("detector '{detector}' has {axial} axial but {stereo} stereo {volume} sensors")]
    UnpairedSensors {
        detector: String,
        volume: Volume,
        axial: usize,
        stereo: usize,
    },

    #[error("no detector labelled '{0}' is configured")]
    UnknownDetector(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
