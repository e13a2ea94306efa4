//! Run configuration: which geometry dumps to compare and which sensor
//! columns each volume's master table carries.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use svtgeo_parser::Volume;

use crate::error::{GeometryError, Result};
use crate::tables::Alignment;

/// Trailing placeholder cells given to 2016-era geometries, which have two
/// fewer sensor positions per volume than later runs.
pub const LEGACY_PADDING: usize = 2;

/// One geometry dump to include in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorEntry {
    pub label: String,
    pub path: PathBuf,
    /// Data-taking year, selects the reference layer.
    pub year: i32,
    /// Forces positional column alignment with this many placeholder cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<usize>,
}

impl DetectorEntry {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, year: i32) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            year,
            padding: None,
        }
    }

    /// How this detector's values line up with the schema columns. Labels
    /// naming a 2016 geometry default to positional alignment with
    /// [`LEGACY_PADDING`] placeholders.
    pub fn alignment(&self) -> Alignment {
        match self.padding {
            Some(padding) => Alignment::Positional { padding },
            None if self.label.contains("16") => Alignment::Positional {
                padding: LEGACY_PADDING,
            },
            None => Alignment::ByName,
        }
    }
}

/// Ordered sensor columns of the master tables, per volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSchemas {
    #[serde(default = "default_top_schema")]
    pub top: Vec<String>,
    #[serde(default = "default_bottom_schema")]
    pub bottom: Vec<String>,
}

impl VolumeSchemas {
    pub fn for_volume(&self, volume: Volume) -> &[String] {
        match volume {
            Volume::Top => &self.top,
            Volume::Bottom => &self.bottom,
        }
    }

    /// Top columns followed by bottom columns.
    pub fn all(&self) -> Vec<String> {
        self.top.iter().chain(self.bottom.iter()).cloned().collect()
    }
}

impl Default for VolumeSchemas {
    fn default() -> Self {
        Self {
            top: default_top_schema(),
            bottom: default_bottom_schema(),
        }
    }
}

const TOP_SENSORS: [&str; 20] = [
    "L1tA", "L1tS", "L2tA", "L2tS", "L3tA", "L3tS", "L4tA", "L4tS", "L5tAs", "L5tAh", "L5tSs",
    "L5tSh", "L6tAs", "L6tAh", "L6tSs", "L6tSh", "L7tAs", "L7tAh", "L7tSs", "L7tSh",
];

const BOTTOM_SENSORS: [&str; 20] = [
    "L1bS", "L1bA", "L2bS", "L2bA", "L3bS", "L3bA", "L4bS", "L4bA", "L5bSs", "L5bSh", "L5bAs",
    "L5bAh", "L6bSs", "L6bSh", "L6bAs", "L6bAh", "L7bSs", "L7bSh", "L7bAs", "L7bAh",
];

fn default_top_schema() -> Vec<String> {
    TOP_SENSORS.iter().map(|name| name.to_string()).collect()
}

fn default_bottom_schema() -> Vec<String> {
    BOTTOM_SENSORS.iter().map(|name| name.to_string()).collect()
}

static DEFAULT_DETECTORS: Lazy<Vec<DetectorEntry>> = Lazy::new(|| {
    vec![
        DetectorEntry::new("geoDumpCat19", "geoDumpCat19.txt", 2019),
        DetectorEntry::new("geoDumpCat21", "geoDumpCat21.txt", 2021),
        DetectorEntry::new("detOGP", "geoOGP.txt", 2019),
        DetectorEntry::new(
            "HPS-PhysicsRun2016-Pass2",
            "HPS-PhysicsRun2016-Pass2.txt",
            2016,
        ),
        DetectorEntry::new(
            "HPS-PhysicsRun2016-Pass2_db",
            "HPS-PhysicsRun2016-Pass2_db.txt",
            2016,
        ),
        DetectorEntry::new(
            "HPS_PhysicsRun2019_Pass2",
            "HPS_PhysicsRun2019_Pass2.txt",
            2019,
        ),
        DetectorEntry::new("HPS_TimDesign_iter0", "HPS_TimDesign_iter0.txt", 2019),
        DetectorEntry::new("HPS_Run2021Pass1_v3", "HPS_Run2021Pass1_v3.txt", 2021),
    ]
});

pub fn default_detectors() -> &'static [DetectorEntry] {
    DEFAULT_DETECTORS.as_slice()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_detector_list() -> Vec<DetectorEntry> {
    default_detectors().to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory that relative detector paths are resolved against.
    #[serde(default = "default_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_detector_list")]
    pub detectors: Vec<DetectorEntry>,

    #[serde(default)]
    pub schema: VolumeSchemas,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: default_dir(),
            output_dir: default_dir(),
            detectors: default_detector_list(),
            schema: VolumeSchemas::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GeometryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn detector(&self, label: &str) -> Result<&DetectorEntry> {
        self.detectors
            .iter()
            .find(|entry| entry.label == label)
            .ok_or_else(|| GeometryError::UnknownDetector(label.to_string()))
    }

    pub fn detector_path(&self, entry: &DetectorEntry) -> PathBuf {
        self.input_dir.join(&entry.path)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.detectors.is_empty() {
            return Err(GeometryError::Config("no detectors configured".into()));
        }

        let mut labels = HashSet::new();
        for entry in &self.detectors {
            if entry.label.trim().is_empty() {
                return Err(GeometryError::Config(format!(
                    "detector for '{}' has an empty label",
                    entry.path.display()
                )));
            }
            if !labels.insert(entry.label.as_str()) {
                return Err(GeometryError::Config(format!(
                    "detector label '{}' is configured twice",
                    entry.label
                )));
            }
        }

        for volume in Volume::ALL {
            let names = self.schema.for_volume(volume);
            if names.is_empty() {
                return Err(GeometryError::Config(format!("{volume} schema is empty")));
            }
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name.as_str()) {
                    return Err(GeometryError::Config(format!(
                        "{volume} schema lists '{name}' twice"
                    )));
                }
                if Volume::of_name(name) != Some(volume) {
                    return Err(GeometryError::Config(format!(
                        "{volume} schema entry '{name}' does not carry the '{}' volume marker",
                        volume.marker()
                    )));
                }
            }
        }

        Ok(())
    }
}
