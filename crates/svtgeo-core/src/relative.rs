use svtgeo_parser::{Sensor, SensorSet, Volume};

use crate::error::{GeometryError, Result};

/// 2016 geometries measure against layer 2; every other year uses layer 3.
const LEGACY_YEAR: i32 = 2016;

/// Canonical name of the sensor every relative position in a (year, volume)
/// set is measured from: `L2tA`, `L2bS`, `L3tA` or `L3bS`.
pub fn reference_sensor(year: i32, volume: Volume) -> String {
    let layer = if year == LEGACY_YEAR { "L2" } else { "L3" };
    let suffix = match volume {
        Volume::Top => "tA",
        Volume::Bottom => "bS",
    };
    format!("{layer}{suffix}")
}

/// Returns a copy of `set` with `rel_z_pos` filled in against the reference
/// sensor for `year` and `volume`. The input set is left untouched.
pub fn with_relative_positions(
    detector: &str,
    set: &SensorSet,
    year: i32,
    volume: Volume,
) -> Result<SensorSet> {
    let reference = reference_sensor(year, volume);
    let reference_z = set
        .get(&reference)
        .map(|sensor| sensor.z_pos)
        .ok_or_else(|| GeometryError::MissingReference {
            detector: detector.to_string(),
            reference: reference.clone(),
            year,
            volume,
        })?;

    Ok(set.map(|_, sensor| Sensor {
        z_pos: sensor.z_pos,
        rel_z_pos: sensor.z_pos - reference_z,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_set() -> SensorSet {
        SensorSet::from_pairs([
            ("L1tA", Sensor::at(80.0)),
            ("L2tA", Sensor::at(90.0)),
            ("L3tA", Sensor::at(100.0)),
            ("L3tS", Sensor::at(108.5)),
        ])
        .unwrap()
    }

    #[test]
    fn reference_names() {
        assert_eq!(reference_sensor(2016, Volume::Top), "L2tA");
        assert_eq!(reference_sensor(2016, Volume::Bottom), "L2bS");
        assert_eq!(reference_sensor(2019, Volume::Top), "L3tA");
        assert_eq!(reference_sensor(2021, Volume::Bottom), "L3bS");
    }

    #[test]
    fn positions_are_relative_to_reference() {
        let set = top_set();
        let annotated = with_relative_positions("geo19", &set, 2019, Volume::Top).unwrap();

        assert_eq!(annotated.get("L3tA").unwrap().rel_z_pos, 0.0);
        assert_eq!(annotated.get("L1tA").unwrap().rel_z_pos, -20.0);
        assert_eq!(annotated.get("L3tS").unwrap().rel_z_pos, 8.5);
        for (_, sensor) in annotated.iter() {
            assert_eq!(sensor.rel_z_pos, sensor.z_pos - 100.0);
        }
        let names: Vec<&str> = annotated.names().collect();
        let original: Vec<&str> = set.names().collect();
        assert_eq!(names, original);
    }

    #[test]
    fn input_set_is_not_mutated() {
        let set = top_set();
        let _ = with_relative_positions("geo19", &set, 2019, Volume::Top).unwrap();
        assert!(set.iter().all(|(_, sensor)| sensor.rel_z_pos == 0.0));
    }

    #[test]
    fn legacy_year_switches_reference_layer() {
        let set = top_set();
        let annotated = with_relative_positions("run16", &set, 2016, Volume::Top).unwrap();
        assert_eq!(annotated.get("L2tA").unwrap().rel_z_pos, 0.0);
        assert_eq!(annotated.get("L3tA").unwrap().rel_z_pos, 10.0);
    }

    #[test]
    fn missing_reference_is_an_error() {
        let set = SensorSet::from_pairs([("L3tA", Sensor::at(100.0))]).unwrap();
        let err = with_relative_positions("run16", &set, 2016, Volume::Top).unwrap_err();
        match err {
            GeometryError::MissingReference {
                reference, year, ..
            } => {
                assert_eq!(reference, "L2tA");
                assert_eq!(year, 2016);
            }
            other => panic!("expected MissingReference, got {other}"),
        }
    }
}
