use crate::errors::ParserError;
use crate::model::{ParsedGeometry, Sensor, SensorSet, SensorSetError, Volume};
use crate::naming::canonical_name;
use crate::registry::GeometryParser;

use super::{parse_required_f64, split_position_list, split_sensor_line};

pub struct GeoDumpParser;

impl Default for GeoDumpParser {
    fn default() -> Self {
        Self
    }
}

impl GeoDumpParser {
    const NAME: &'static str = "GEO_DUMP";
    const Z_FIELD: usize = 2;

    fn is_bracketed(list: &str) -> bool {
        let list = list.trim();
        list.starts_with('[') && list.ends_with(']')
    }

    fn looks_like_dump(line: &str) -> bool {
        split_sensor_line(line)
            .map(|(_, list)| Self::is_bracketed(list))
            .unwrap_or(false)
    }

    fn parse_line(line: &str, line_index: usize) -> Result<(String, f64), ParserError> {
        let (raw_name, list) = split_sensor_line(line).ok_or_else(|| ParserError::DataRow {
            parser: Self::NAME,
            line_index,
            message: "expected '<name>: [<x>, <y>, <z>]'".to_string(),
        })?;
        if !Self::is_bracketed(list) {
            return Err(ParserError::DataRow {
                parser: Self::NAME,
                line_index,
                message: format!("position list is not enclosed in brackets: '{list}'"),
            });
        }
        let name = canonical_name(raw_name)?;

        let fields = split_position_list(list);
        let z_raw = fields.get(Self::Z_FIELD).ok_or_else(|| ParserError::DataRow {
            parser: Self::NAME,
            line_index,
            message: format!(
                "expected at least {} position fields but found {}",
                Self::Z_FIELD + 1,
                fields.len()
            ),
        })?;
        let z_pos = parse_required_f64(Self::NAME, z_raw, line_index, "z")?;

        Ok((name, z_pos))
    }
}

impl GeometryParser for GeoDumpParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ParsedGeometry, ParserError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty())
            .peekable();

        match lines.peek() {
            None => return Err(ParserError::EmptyData { parser: Self::NAME }),
            Some((_, first)) if !Self::looks_like_dump(first) => {
                return Err(ParserError::FormatMismatch {
                    parser: Self::NAME,
                    reason: format!("first line is not a '<name>: [..]' sensor row: '{first}'"),
                });
            }
            Some(_) => {}
        }

        let mut parsed = ParsedGeometry {
            file_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
            top: SensorSet::new(),
            bottom: SensorSet::new(),
            skipped: Vec::new(),
        };

        for (line_index, line) in lines {
            let (name, z_pos) = Self::parse_line(line, line_index)?;

            let Some(volume) = Volume::of_name(&name) else {
                parsed.skipped.push(name);
                continue;
            };

            parsed
                .volume_mut(volume)
                .insert_sorted(name, Sensor::at(z_pos))
                .map_err(|SensorSetError::Duplicate(name)| ParserError::DuplicateSensor {
                    parser: Self::NAME,
                    line_index,
                    name,
                    volume: volume.as_str(),
                })?;
        }

        Ok(parsed)
    }
}
