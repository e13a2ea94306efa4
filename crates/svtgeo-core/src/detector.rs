use std::path::Path;

use svtgeo_parser::{parse_geometry_path, SensorSet, Volume};
use tracing::{debug, warn};

use crate::config::DetectorEntry;
use crate::error::Result;
use crate::relative::with_relative_positions;
use crate::tables::Alignment;

/// One labelled geometry snapshot with its top and bottom sensor sets.
#[derive(Debug, Clone)]
pub struct Detector {
    pub label: String,
    pub year: i32,
    pub alignment: Alignment,
    /// blake3 hash of the dump the sets were parsed from.
    pub source_hash: String,
    pub top: SensorSet,
    pub bottom: SensorSet,
}

impl Detector {
    pub fn volume(&self, volume: Volume) -> &SensorSet {
        match volume {
            Volume::Top => &self.top,
            Volume::Bottom => &self.bottom,
        }
    }

    /// Top sensors followed by bottom sensors.
    pub fn merged(&self) -> SensorSet {
        self.top.merged(&self.bottom)
    }

    /// Copy of this detector with relative positions computed for both
    /// volumes from the detector's own year.
    pub fn annotated(&self) -> Result<Detector> {
        let top = with_relative_positions(&self.label, &self.top, self.year, Volume::Top)?;
        let bottom =
            with_relative_positions(&self.label, &self.bottom, self.year, Volume::Bottom)?;
        Ok(Detector {
            top,
            bottom,
            ..self.clone()
        })
    }
}

/// Parses the dump behind `entry` (resolved at `path`) into an un-annotated
/// detector.
pub fn load_detector(entry: &DetectorEntry, path: &Path) -> Result<Detector> {
    let parsed = parse_geometry_path(path)?;

    for name in &parsed.skipped {
        warn!(
            detector = %entry.label,
            sensor = %name,
            "Sensor has no single volume marker; skipping"
        );
    }
    debug!(
        detector = %entry.label,
        path = %path.display(),
        top = parsed.top.len(),
        bottom = parsed.bottom.len(),
        "Parsed geometry dump"
    );

    Ok(Detector {
        label: entry.label.clone(),
        year: entry.year,
        alignment: entry.alignment(),
        source_hash: parsed.file_hash,
        top: parsed.top,
        bottom: parsed.bottom,
    })
}
