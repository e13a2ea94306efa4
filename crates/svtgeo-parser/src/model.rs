use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Volume {
    Top,
    Bottom,
}

impl Volume {
    pub const ALL: [Volume; 2] = [Volume::Top, Volume::Bottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Volume::Top => "top",
            Volume::Bottom => "bottom",
        }
    }

    pub fn marker(&self) -> char {
        match self {
            Volume::Top => 't',
            Volume::Bottom => 'b',
        }
    }

    // names with neither marker, or both, belong to no volume
    pub fn of_name(name: &str) -> Option<Volume> {
        match (name.contains('t'), name.contains('b')) {
            (true, false) => Some(Volume::Top),
            (false, true) => Some(Volume::Bottom),
            _ => None,
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sensor {
    pub z_pos: f64,
    pub rel_z_pos: f64,
}

impl Sensor {
    pub fn at(z_pos: f64) -> Self {
        Self {
            z_pos,
            rel_z_pos: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorSetError {
    #[error("sensor '{0}' is already present")]
    Duplicate(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSet {
    entries: Vec<(String, Sensor)>,
}

impl SensorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, SensorSetError>
    where
        I: IntoIterator<Item = (S, Sensor)>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for (name, sensor) in pairs {
            set.insert_sorted(name, sensor)?;
        }
        Ok(set)
    }

    pub fn insert_sorted(
        &mut self,
        name: impl Into<String>,
        sensor: Sensor,
    ) -> Result<(), SensorSetError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SensorSetError::Duplicate(name));
        }
        // ascending z; equal positions keep insertion order
        let index = self
            .entries
            .partition_point(|(_, existing)| existing.z_pos <= sensor.z_pos);
        self.entries.insert(index, (name, sensor));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Sensor> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, sensor)| sensor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sensor)> {
        self.entries
            .iter()
            .map(|(name, sensor)| (name.as_str(), sensor))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_sorted_by_z(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].1.z_pos <= pair[1].1.z_pos)
    }

    pub fn map<F>(&self, mut f: F) -> SensorSet
    where
        F: FnMut(&str, &Sensor) -> Sensor,
    {
        let entries = self
            .entries
            .iter()
            .map(|(name, sensor)| (name.clone(), f(name, sensor)))
            .collect();
        SensorSet { entries }
    }

    pub fn filter<P>(&self, mut predicate: P) -> SensorSet
    where
        P: FnMut(&str, &Sensor) -> bool,
    {
        let entries = self
            .entries
            .iter()
            .filter(|(name, sensor)| predicate(name, sensor))
            .cloned()
            .collect();
        SensorSet { entries }
    }

    // A name present in both keeps its position from `self` and takes the
    // sensor from `other`.
    pub fn merged(&self, other: &SensorSet) -> SensorSet {
        let mut entries = self.entries.clone();
        for (name, sensor) in &other.entries {
            match entries.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = *sensor,
                None => entries.push((name.clone(), *sensor)),
            }
        }
        SensorSet { entries }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedGeometry {
    pub file_hash: String,
    pub top: SensorSet,
    pub bottom: SensorSet,
    pub skipped: Vec<String>,
}

impl ParsedGeometry {
    pub fn volume(&self, volume: Volume) -> &SensorSet {
        match volume {
            Volume::Top => &self.top,
            Volume::Bottom => &self.bottom,
        }
    }

    pub fn volume_mut(&mut self, volume: Volume) -> &mut SensorSet {
        match volume {
            Volume::Top => &mut self.top,
            Volume::Bottom => &mut self.bottom,
        }
    }

    pub fn sensor_count(&self) -> usize {
        self.top.len() + self.bottom.len()
    }
}
