use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Ambiguous boolean value '{0}'. Expected one of: true, false, yes, no, on, off, 1, 0."
    )]
    AmbiguousBool(String),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Key cannot be empty in assignment '{0}'.")]
    EmptyKey(String),
}

/// Parses a case-insensitive boolean word.
pub fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::AmbiguousBool(value.to_string())),
    }
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_assignment(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignment(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(pair.to_string()));
    }
    Ok((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_boolean_words_parse() {
        for word in ["true", "YES", "On", "1"] {
            assert_eq!(parse_bool(word), Ok(true), "{word}");
        }
        for word in ["false", "No", "OFF", "0"] {
            assert_eq!(parse_bool(word), Ok(false), "{word}");
        }
    }

    #[test]
    fn other_words_are_ambiguous() {
        assert_eq!(
            parse_bool("maybe"),
            Err(ParseError::AmbiguousBool("maybe".to_string()))
        );
        assert!(parse_bool("").is_err());
        assert!(parse_bool("2").is_err());
    }

    #[test]
    fn assignment_splits_at_first_equals() {
        assert_eq!(
            parse_assignment("grouping.property=A=B"),
            Ok(("grouping.property", "A=B"))
        );
        assert_eq!(
            parse_assignment(" selection.metric = internal-distance "),
            Ok(("selection.metric", "internal-distance"))
        );
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(matches!(
            parse_assignment("selection.metric"),
            Err(ParseError::InvalidAssignment(_))
        ));
        assert!(matches!(
            parse_assignment("=value"),
            Err(ParseError::EmptyKey(_))
        ));
    }
}
