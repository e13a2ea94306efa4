//! CSV comparison tables.
//!
//! Three layouts are supported:
//! - single detector, long form (`name, z_pos, rel_z_pos`)
//! - several detectors side by side (`name, <det>_z_pos, <det>_rel_z_pos, ...`)
//! - several detectors transposed: two rows per detector, one column per sensor
//!
//! Tables are built in memory first, so a validation failure never leaves a
//! half-written file behind.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use svtgeo_parser::{Sensor, SensorSet, Volume};
use tracing::warn;

use crate::error::{GeometryError, Result};

/// Literal written where a detector has no value for a cell.
pub const PLACEHOLDER: &str = "0.0";

pub const SINGLE_HEADER: [&str; 3] = ["name", "z_pos", "rel_z_pos"];

const TRANSPOSED_LEAD: [&str; 2] = ["detector names", "position"];

/// How a detector's sensors map onto the transposed table's schema columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Every schema column is looked up by sensor name; the detector must
    /// have exactly the schema's sensors.
    ByName,
    /// Values are taken in z order and followed by `padding` placeholder
    /// cells. The padded row must be exactly as wide as the schema.
    Positional { padding: usize },
}

/// Which sensors become rows of the wide table.
#[derive(Debug, Clone, Copy)]
pub enum RowAxis<'a> {
    /// The first detector's sensors, in its order.
    FirstDetector,
    /// An authoritative ordered list of sensor names.
    Expected(&'a [String]),
}

/// One detector's contribution to a transposed table.
#[derive(Debug, Clone, Copy)]
pub struct DetectorColumns<'a> {
    pub label: &'a str,
    pub alignment: Alignment,
    pub sensors: &'a SensorSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    ZPos,
    RelZPos,
}

impl Metric {
    const ALL: [Metric; 2] = [Metric::ZPos, Metric::RelZPos];

    fn as_str(&self) -> &'static str {
        match self {
            Metric::ZPos => "z_pos",
            Metric::RelZPos => "rel_z_pos",
        }
    }

    fn value(&self, sensor: &Sensor) -> f64 {
        match self {
            Metric::ZPos => sensor.z_pos,
            Metric::RelZPos => sensor.rel_z_pos,
        }
    }
}

/// Formats a position so integral values keep a trailing `.0`.
pub fn format_value(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn write_to<W: Write>(&self, out: W) -> std::result::Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the table to `path`, creating parent directories as needed.
    /// Returns the number of data rows written.
    pub fn write_csv(&self, path: &Path) -> Result<usize> {
        ensure_parent_dirs(path)?;
        let file = File::create(path).map_err(|source| GeometryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(BufWriter::new(file))
            .map_err(|source| GeometryError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.rows.len())
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| GeometryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Long-form table of one detector: top sensors then bottom sensors. A name
/// present in both volumes takes the bottom values.
pub fn single_table(top: &SensorSet, bottom: &SensorSet) -> Table {
    let rows = top
        .merged(bottom)
        .iter()
        .map(|(name, sensor)| {
            vec![
                name.to_string(),
                format_value(sensor.z_pos),
                format_value(sensor.rel_z_pos),
            ]
        })
        .collect();

    Table {
        header: SINGLE_HEADER.iter().map(|col| col.to_string()).collect(),
        rows,
    }
}

pub fn write_single_csv(path: &Path, top: &SensorSet, bottom: &SensorSet) -> Result<usize> {
    single_table(top, bottom).write_csv(path)
}

/// Side-by-side table with one `z_pos`/`rel_z_pos` column pair per detector.
/// A detector lacking a row's sensor gets placeholder cells.
pub fn wide_table(detectors: &[(&str, &SensorSet)], axis: RowAxis<'_>) -> Table {
    let mut header = vec!["name".to_string()];
    for (label, _) in detectors {
        header.push(format!("{label}_z_pos"));
        header.push(format!("{label}_rel_z_pos"));
    }

    let row_names: Vec<String> = match axis {
        RowAxis::FirstDetector => detectors
            .first()
            .map(|(_, sensors)| sensors.names().map(str::to_string).collect())
            .unwrap_or_default(),
        RowAxis::Expected(names) => names.to_vec(),
    };

    let covered: HashSet<&str> = row_names.iter().map(String::as_str).collect();
    for (label, sensors) in detectors {
        let uncovered: Vec<&str> = sensors
            .names()
            .filter(|name| !covered.contains(name))
            .collect();
        if !uncovered.is_empty() {
            warn!(
                detector = %label,
                sensors = ?uncovered,
                "Sensors have no row in the wide table"
            );
        }
    }

    let rows = row_names
        .iter()
        .map(|name| {
            let mut row = Vec::with_capacity(1 + detectors.len() * 2);
            row.push(name.clone());
            for (_, sensors) in detectors {
                match sensors.get(name) {
                    Some(sensor) => {
                        row.push(format_value(sensor.z_pos));
                        row.push(format_value(sensor.rel_z_pos));
                    }
                    None => {
                        row.push(PLACEHOLDER.to_string());
                        row.push(PLACEHOLDER.to_string());
                    }
                }
            }
            row
        })
        .collect();

    Table { header, rows }
}

pub fn write_wide_csv(
    path: &Path,
    detectors: &[(&str, &SensorSet)],
    axis: RowAxis<'_>,
) -> Result<usize> {
    wide_table(detectors, axis).write_csv(path)
}

/// Transposed table: a `z_pos` row and a `rel_z_pos` row per detector, one
/// column per schema sensor.
pub fn transposed_table(
    detectors: &[DetectorColumns<'_>],
    volume: Volume,
    schema: &[String],
) -> Result<Table> {
    let header = TRANSPOSED_LEAD
        .iter()
        .map(|col| col.to_string())
        .chain(schema.iter().cloned())
        .collect();

    let mut rows = Vec::with_capacity(detectors.len() * Metric::ALL.len());
    for detector in detectors {
        let ordered = ordered_sensors(detector, volume, schema)?;
        for metric in Metric::ALL {
            let mut row = Vec::with_capacity(TRANSPOSED_LEAD.len() + schema.len());
            row.push(detector.label.to_string());
            row.push(metric.as_str().to_string());
            for cell in &ordered {
                row.push(match cell {
                    Some(sensor) => format_value(metric.value(sensor)),
                    None => PLACEHOLDER.to_string(),
                });
            }
            rows.push(row);
        }
    }

    Ok(Table { header, rows })
}

/// Lines a detector's sensors up with the schema columns. `None` marks a
/// placeholder cell.
fn ordered_sensors<'a>(
    detector: &DetectorColumns<'a>,
    volume: Volume,
    schema: &[String],
) -> Result<Vec<Option<&'a Sensor>>> {
    match detector.alignment {
        Alignment::ByName => {
            let mut cells = Vec::with_capacity(schema.len());
            for name in schema {
                let sensor =
                    detector
                        .sensors
                        .get(name)
                        .ok_or_else(|| GeometryError::MissingSensor {
                            detector: detector.label.to_string(),
                            sensor: name.clone(),
                            volume,
                        })?;
                cells.push(Some(sensor));
            }
            if let Some(extra) = detector
                .sensors
                .names()
                .find(|name| !schema.iter().any(|expected| expected == name))
            {
                return Err(GeometryError::UnexpectedSensor {
                    detector: detector.label.to_string(),
                    sensor: extra.to_string(),
                    volume,
                });
            }
            Ok(cells)
        }
        Alignment::Positional { padding } => {
            let found = detector.sensors.len() + padding;
            if found != schema.len() {
                return Err(GeometryError::ColumnMismatch {
                    detector: detector.label.to_string(),
                    volume,
                    expected: schema.len(),
                    found,
                });
            }
            let sensors: &'a SensorSet = detector.sensors;
            Ok(sensors
                .iter()
                .map(|(_, sensor)| Some(sensor))
                .chain(std::iter::repeat(None).take(padding))
                .collect())
        }
    }
}

pub fn write_transposed_csv(
    path: &Path,
    detectors: &[DetectorColumns<'_>],
    volume: Volume,
    schema: &[String],
) -> Result<usize> {
    transposed_table(detectors, volume, schema)?.write_csv(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, f64, f64)]) -> SensorSet {
        SensorSet::from_pairs(pairs.iter().map(|(name, z, rel)| {
            (
                *name,
                Sensor {
                    z_pos: *z,
                    rel_z_pos: *rel,
                },
            )
        }))
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    fn render(table: &Table) -> String {
        let mut buffer = Vec::new();
        table.write_to(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn formats_integral_values_with_decimal() {
        assert_eq!(format_value(100.0), "100.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-20.0), "-20.0");
        assert_eq!(format_value(42.5), "42.5");
        assert_eq!(format_value(-0.125), "-0.125");
    }

    #[test]
    fn single_table_lists_top_then_bottom() {
        let top = set(&[("L1tA", 10.0, -5.0), ("L2tA", 15.0, 0.0)]);
        let bottom = set(&[("L1bS", 11.0, -4.5)]);
        let text = render(&single_table(&top, &bottom));
        assert_eq!(
            text,
            "name,z_pos,rel_z_pos\nL1tA,10.0,-5.0\nL2tA,15.0,0.0\nL1bS,11.0,-4.5\n"
        );
    }

    #[test]
    fn single_table_round_trips_through_csv() {
        let top = set(&[("L3tA", 100.0, 0.0), ("L3tS", 108.25, 8.25)]);
        let bottom = set(&[("L3bS", 101.5, 0.0), ("L3bA", 109.75, 8.25)]);
        let text = render(&single_table(&top, &bottom));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), SINGLE_HEADER);

        let recovered: Vec<(String, f64, f64)> = reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                (
                    record[0].to_string(),
                    record[1].parse().unwrap(),
                    record[2].parse().unwrap(),
                )
            })
            .collect();
        let expected: Vec<(String, f64, f64)> = top
            .merged(&bottom)
            .iter()
            .map(|(name, sensor)| (name.to_string(), sensor.z_pos, sensor.rel_z_pos))
            .collect();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn wide_table_pads_missing_sensors_with_literal_zeroes() {
        let first = set(&[("L1tA", 10.0, 0.0), ("L2tA", 20.0, 10.0)]);
        let second = set(&[("L1tA", 12.0, 0.0)]);
        let table = wide_table(&[("a", &first), ("b", &second)], RowAxis::FirstDetector);

        assert_eq!(
            table.header,
            names(&["name", "a_z_pos", "a_rel_z_pos", "b_z_pos", "b_rel_z_pos"])
        );
        assert_eq!(table.rows[0], names(&["L1tA", "10.0", "0.0", "12.0", "0.0"]));
        assert_eq!(table.rows[1], names(&["L2tA", "20.0", "10.0", "0.0", "0.0"]));
    }

    #[test]
    fn wide_table_first_detector_axis_ignores_extra_sensors() {
        let first = set(&[("L1tA", 10.0, 0.0)]);
        let second = set(&[("L1tA", 12.0, 0.0), ("L0tA", 2.0, -10.0)]);
        let table = wide_table(&[("a", &first), ("b", &second)], RowAxis::FirstDetector);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn wide_table_follows_expected_axis() {
        let first = set(&[("L2tA", 20.0, 0.0)]);
        let second = set(&[("L1tA", 12.0, 0.0)]);
        let axis = names(&["L1tA", "L2tA"]);
        let table = wide_table(&[("a", &first), ("b", &second)], RowAxis::Expected(&axis));

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], names(&["L1tA", "0.0", "0.0", "12.0", "0.0"]));
        assert_eq!(table.rows[1], names(&["L2tA", "20.0", "0.0", "0.0", "0.0"]));
    }

    #[test]
    fn transposed_by_name_follows_schema_order() {
        let schema = names(&["L1tA", "L1tS", "L2tA"]);
        // L1tS sits upstream of L1tA here, so z order differs from schema order.
        let sensors = set(&[("L1tA", 10.0, -10.0), ("L1tS", 9.0, -11.0), ("L2tA", 20.0, 0.0)]);
        let detectors = [DetectorColumns {
            label: "geo19",
            alignment: Alignment::ByName,
            sensors: &sensors,
        }];
        let table = transposed_table(&detectors, Volume::Top, &schema).unwrap();

        assert_eq!(
            table.header,
            names(&["detector names", "position", "L1tA", "L1tS", "L2tA"])
        );
        assert_eq!(
            table.rows,
            vec![
                names(&["geo19", "z_pos", "10.0", "9.0", "20.0"]),
                names(&["geo19", "rel_z_pos", "-10.0", "-11.0", "0.0"]),
            ]
        );
    }

    #[test]
    fn transposed_by_name_reports_missing_sensor() {
        let schema = names(&["L1tA", "L2tA"]);
        let sensors = set(&[("L1tA", 10.0, 0.0)]);
        let detectors = [DetectorColumns {
            label: "geo19",
            alignment: Alignment::ByName,
            sensors: &sensors,
        }];
        let err = transposed_table(&detectors, Volume::Top, &schema).unwrap_err();
        assert!(matches!(err, GeometryError::MissingSensor { sensor, .. } if sensor == "L2tA"));
    }

    #[test]
    fn transposed_validation_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master_top.csv");
        let schema = names(&["L1tA", "L2tA"]);
        let sensors = set(&[("L1tA", 10.0, 0.0)]);
        let detectors = [DetectorColumns {
            label: "geo19",
            alignment: Alignment::ByName,
            sensors: &sensors,
        }];

        assert!(write_transposed_csv(&path, &detectors, Volume::Top, &schema).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn transposed_by_name_reports_unexpected_sensor() {
        let schema = names(&["L1tA"]);
        let sensors = set(&[("L1tA", 10.0, 0.0), ("L0tA", 5.0, -5.0)]);
        let detectors = [DetectorColumns {
            label: "geo19",
            alignment: Alignment::ByName,
            sensors: &sensors,
        }];
        let err = transposed_table(&detectors, Volume::Top, &schema).unwrap_err();
        assert!(matches!(err, GeometryError::UnexpectedSensor { sensor, .. } if sensor == "L0tA"));
    }

    #[test]
    fn positional_rows_get_trailing_placeholders() {
        let schema = names(&["L1bS", "L1bA", "L2bS", "L2bA"]);
        let sensors = set(&[("L1bS", 10.0, -10.0), ("L1bA", 20.0, 0.0)]);
        let detectors = [DetectorColumns {
            label: "HPS-PhysicsRun2016-Pass2",
            alignment: Alignment::Positional { padding: 2 },
            sensors: &sensors,
        }];
        let table = transposed_table(&detectors, Volume::Bottom, &schema).unwrap();

        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert_eq!(row.len(), 2 + schema.len());
            assert_eq!(&row[row.len() - 2..], ["0.0", "0.0"]);
        }
        assert_eq!(table.rows[0][2..4], ["10.0", "20.0"]);
    }

    #[test]
    fn positional_width_mismatch_is_detected() {
        let schema = names(&["L1bS", "L1bA", "L2bS", "L2bA"]);
        let sensors = set(&[("L1bS", 10.0, 0.0)]);
        let detectors = [DetectorColumns {
            label: "HPS-PhysicsRun2016-Pass2",
            alignment: Alignment::Positional { padding: 2 },
            sensors: &sensors,
        }];
        let err = transposed_table(&detectors, Volume::Bottom, &schema).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::ColumnMismatch {
                expected: 4,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn write_csv_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("single.csv");
        let top = set(&[("L1tA", 1.0, 0.0)]);
        let written = write_single_csv(&path, &top, &SensorSet::new()).unwrap();
        assert_eq!(written, 1);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("name,z_pos,rel_z_pos"));
    }
}
