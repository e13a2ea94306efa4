use crate::errors::ParserError;

pub(crate) fn split_sensor_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

pub(crate) fn split_position_list(list: &str) -> Vec<&str> {
    list.trim_matches(|c: char| matches!(c, '[' | ']' | '\n' | '\r'))
        .split(", ")
        .collect()
}

pub(crate) fn parse_required_f64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    field: &str,
) -> Result<f64, ParserError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse {field} value '{value}': {err}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_position_list() {
        assert_eq!(
            split_position_list("[1.0, -2.5, 42.5]\n"),
            vec!["1.0", "-2.5", "42.5"]
        );
        assert_eq!(split_position_list("[3]"), vec!["3"]);
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(
            split_sensor_line("module_L1t_axial: [0, 0, 1]"),
            Some(("module_L1t_axial", "[0, 0, 1]"))
        );
        assert_eq!(split_sensor_line("no separator"), None);
    }

    #[test]
    fn rejects_non_numeric_value() {
        let err = parse_required_f64("TEST", "abc", 3, "z").unwrap_err();
        match err {
            ParserError::DataRow { line_index, .. } => assert_eq!(line_index, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
