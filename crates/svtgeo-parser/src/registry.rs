use std::fs;
use std::path::Path;

use crate::errors::{ParserAttempt, ParserError};
use crate::formats::GeoDumpParser;
use crate::model::ParsedGeometry;

pub trait GeometryParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<ParsedGeometry, ParserError>;
}

pub fn parse_geometry_file(content: &str) -> Result<ParsedGeometry, ParserError> {
    let geo_dump = GeoDumpParser;
    let parsers: [&dyn GeometryParser; 1] = [&geo_dump];
    parse_with_parsers(content, &parsers)
}

pub fn parse_geometry_path(path: impl AsRef<Path>) -> Result<ParsedGeometry, ParserError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geometry_file(&content)
}

pub fn parse_with_parsers(
    content: &str,
    parsers: &[&dyn GeometryParser],
) -> Result<ParsedGeometry, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
