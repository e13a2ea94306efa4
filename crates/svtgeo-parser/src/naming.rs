use crate::errors::ParserError;

pub fn canonical_name(raw: &str) -> Result<String, ParserError> {
    let mut name = raw
        .split('_')
        .nth(1)
        .ok_or_else(|| ParserError::InvalidSensorName {
            raw: raw.to_string(),
            message: "expected at least two '_'-separated segments".to_string(),
        })?
        .to_string();

    if raw.contains("axial") {
        name.push('A');
    } else if raw.contains("stereo") {
        name.push('S');
    }

    if raw.contains("slot") {
        name.push('s');
    } else if raw.contains("hole") {
        name.push('h');
    }

    Ok(name)
}
