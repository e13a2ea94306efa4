//! Axial/stereo pairing within one volume.
//!
//! Each layer of a half-module carries an axial and a stereo sensor. Sorting
//! both kinds by z and pairing them index by index gives the spacing inside
//! every layer and the layer's mean position.

use std::path::Path;

use svtgeo_parser::{SensorSet, Volume};

use crate::error::{GeometryError, Result};
use crate::tables::{format_value, Table};

pub const PAIR_HEADER: [&str; 7] = [
    "detector",
    "volume",
    "sensor",
    "axial",
    "stereo",
    "separation",
    "average_z_pos",
];

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPair {
    /// Name the separation is reported under: the axial sensor for top
    /// layers, the stereo sensor otherwise.
    pub sensor: String,
    pub axial: String,
    pub stereo: String,
    /// Downstream minus upstream sensor of the pair (stereo minus axial on
    /// top, axial minus stereo on bottom).
    pub separation: f64,
    pub average_z_pos: f64,
}

fn sorted_by_z(set: &SensorSet) -> Vec<(&str, f64)> {
    let mut sensors: Vec<(&str, f64)> = set.iter().map(|(name, s)| (name, s.z_pos)).collect();
    sensors.sort_by(|a, b| a.1.total_cmp(&b.1));
    sensors
}

pub fn layer_pairs(detector: &str, volume: Volume, set: &SensorSet) -> Result<Vec<LayerPair>> {
    let axial_set = set.filter(|name, _| name.contains('A'));
    let stereo_set = set.filter(|name, _| !name.contains('A') && name.contains('S'));
    let axial = sorted_by_z(&axial_set);
    let stereo = sorted_by_z(&stereo_set);

    if axial.len() != stereo.len() {
        return Err(GeometryError::UnpairedSensors {
            detector: detector.to_string(),
            volume,
            axial: axial.len(),
            stereo: stereo.len(),
        });
    }

    Ok(axial
        .iter()
        .zip(stereo.iter())
        .map(|(&(axial_name, axial_z), &(stereo_name, stereo_z))| {
            let (sensor, separation) = if axial_name.contains('t') {
                (axial_name, stereo_z - axial_z)
            } else {
                (stereo_name, axial_z - stereo_z)
            };
            LayerPair {
                sensor: sensor.to_string(),
                axial: axial_name.to_string(),
                stereo: stereo_name.to_string(),
                separation,
                average_z_pos: (stereo_z + axial_z) / 2.0,
            }
        })
        .collect())
}

pub fn pair_table<'a, I>(entries: I) -> Table
where
    I: IntoIterator<Item = (&'a str, Volume, &'a [LayerPair])>,
{
    let mut rows = Vec::new();
    for (detector, volume, pairs) in entries {
        for pair in pairs {
            rows.push(vec![
                detector.to_string(),
                volume.to_string(),
                pair.sensor.clone(),
                pair.axial.clone(),
                pair.stereo.clone(),
                format_value(pair.separation),
                format_value(pair.average_z_pos),
            ]);
        }
    }
    Table {
        header: PAIR_HEADER.iter().map(|col| col.to_string()).collect(),
        rows,
    }
}

pub fn write_pairs_csv<'a, I>(path: &Path, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = (&'a str, Volume, &'a [LayerPair])>,
{
    pair_table(entries).write_csv(path)
}
