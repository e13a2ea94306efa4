use std::path::PathBuf;

use anyhow::{Context, Result};
use svtgeo_parser::Volume;
use tracing::info;

use crate::analysis::{layer_pairs, write_pairs_csv, LayerPair};
use crate::config::RunConfig;
use crate::detector::{load_detector, Detector};
use crate::tables::{
    transposed_table, write_single_csv, write_wide_csv, DetectorColumns, RowAxis,
};

pub const MASTER_TABLE_TOP: &str = "sensor_positions_master_table_top.csv";
pub const MASTER_TABLE_BOTTOM: &str = "sensor_positions_master_table_bottom.csv";
pub const WIDE_TABLE: &str = "sensor_positions_master_table.csv";
pub const PAIR_TABLE: &str = "sensor_pairs.csv";

pub fn detector_table_name(label: &str) -> String {
    format!("sensor_positions_{label}.csv")
}

pub fn master_table_name(volume: Volume) -> &'static str {
    match volume {
        Volume::Top => MASTER_TABLE_TOP,
        Volume::Bottom => MASTER_TABLE_BOTTOM,
    }
}

/// A CSV file produced by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Parses and annotates every configured detector, in configuration order.
pub fn load_detectors(config: &RunConfig) -> Result<Vec<Detector>> {
    config
        .detectors
        .iter()
        .map(|entry| load_annotated(config, &entry.label))
        .collect()
}

/// Parses and annotates a single configured detector.
pub fn load_annotated(config: &RunConfig, label: &str) -> Result<Detector> {
    let entry = config.detector(label)?;
    let path = config.detector_path(entry);
    let detector = load_detector(entry, &path)
        .with_context(|| format!("failed to load detector '{label}'"))?
        .annotated()
        .with_context(|| format!("failed to compute relative positions for '{label}'"))?;

    info!(
        detector = %detector.label,
        year = detector.year,
        hash = %detector.source_hash,
        top = detector.top.len(),
        bottom = detector.bottom.len(),
        "Loaded detector"
    );
    Ok(detector)
}

/// Writes the transposed top and bottom master tables. Both tables are
/// validated before either file is written.
pub fn write_master_tables(
    config: &RunConfig,
    detectors: &[Detector],
) -> Result<Vec<TableSummary>> {
    let mut tables = Vec::with_capacity(Volume::ALL.len());
    for volume in Volume::ALL {
        let columns: Vec<DetectorColumns<'_>> = detectors
            .iter()
            .map(|detector| DetectorColumns {
                label: detector.label.as_str(),
                alignment: detector.alignment,
                sensors: detector.volume(volume),
            })
            .collect();

        let schema = config.schema.for_volume(volume);
        let table = transposed_table(&columns, volume, schema)
            .with_context(|| format!("failed to build {volume} master table"))?;
        tables.push((volume, table));
    }

    let mut summaries = Vec::with_capacity(tables.len());
    for (volume, table) in tables {
        let path = config.output_path(master_table_name(volume));
        let rows = table
            .write_csv(&path)
            .with_context(|| format!("failed to write {volume} master table"))?;
        info!(path = %path.display(), rows, %volume, "Wrote master table");
        summaries.push(TableSummary { path, rows });
    }

    Ok(summaries)
}

/// Writes every detector's merged top and bottom sensors side by side.
/// Rows follow the configured schema unless `first_detector_rows` is set, in
/// which case the first detector's sensors drive the rows.
pub fn write_wide_table(
    config: &RunConfig,
    detectors: &[Detector],
    first_detector_rows: bool,
) -> Result<TableSummary> {
    let merged: Vec<_> = detectors.iter().map(Detector::merged).collect();
    let columns: Vec<(&str, _)> = detectors
        .iter()
        .zip(merged.iter())
        .map(|(detector, sensors)| (detector.label.as_str(), sensors))
        .collect();

    let expected = config.schema.all();
    let axis = if first_detector_rows {
        RowAxis::FirstDetector
    } else {
        RowAxis::Expected(&expected)
    };

    let path = config.output_path(WIDE_TABLE);
    let rows = write_wide_csv(&path, &columns, axis).context("failed to write wide table")?;
    info!(path = %path.display(), rows, "Wrote wide table");
    Ok(TableSummary { path, rows })
}

/// Writes one detector's long-form table.
pub fn write_detector_table(config: &RunConfig, detector: &Detector) -> Result<TableSummary> {
    let path = config.output_path(&detector_table_name(&detector.label));
    let rows = write_single_csv(&path, &detector.top, &detector.bottom)
        .with_context(|| format!("failed to write table for '{}'", detector.label))?;
    info!(path = %path.display(), rows, detector = %detector.label, "Wrote detector table");
    Ok(TableSummary { path, rows })
}

/// Writes the axial/stereo pairs of every detector and volume.
pub fn write_pair_table(config: &RunConfig, detectors: &[Detector]) -> Result<TableSummary> {
    let mut pairs: Vec<(&str, Volume, Vec<LayerPair>)> = Vec::new();
    for detector in detectors {
        for volume in Volume::ALL {
            let layer = layer_pairs(&detector.label, volume, detector.volume(volume))
                .with_context(|| format!("failed to pair sensors of '{}'", detector.label))?;
            pairs.push((detector.label.as_str(), volume, layer));
        }
    }

    let path = config.output_path(PAIR_TABLE);
    let rows = write_pairs_csv(
        &path,
        pairs
            .iter()
            .map(|(label, volume, layer)| (*label, *volume, layer.as_slice())),
    )
    .context("failed to write pair table")?;
    info!(path = %path.display(), rows, "Wrote pair table");
    Ok(TableSummary { path, rows })
}
