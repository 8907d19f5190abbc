//! Request parameter cleaning
//!
//! Alphanumeric parameters are cleaned rather than rejected: characters
//! outside `[A-Za-z0-9]` are stripped. Integer parameters must parse.

use crate::{Error, Result};

/// Strip everything except ASCII letters and digits
///
/// # Examples
///
/// ```
/// use lms_common::api::params::clean_alphanum;
///
/// assert_eq!(clean_alphanum("save-feedback!"), "savefeedback");
/// assert_eq!(clean_alphanum("q1_notes"), "q1notes");
/// ```
pub fn clean_alphanum(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Parse an integer parameter, naming the parameter in the error
pub fn parse_int(name: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput(format!("Parameter '{}' must be an integer", name)))
}

/// Require a parameter to be present, returning it untouched
pub fn required_raw<'a>(name: &str, raw: Option<&'a str>) -> Result<&'a str> {
    raw.ok_or_else(|| missing(name))
}

/// Require a parameter to be present, returning it cleaned
///
/// Presence is checked before cleaning, so a value consisting only of
/// stripped characters yields an empty string rather than an error.
pub fn required_alphanum(name: &str, raw: Option<&str>) -> Result<String> {
    required_raw(name, raw).map(clean_alphanum)
}

/// Require an integer parameter
pub fn required_int(name: &str, raw: Option<&str>) -> Result<i64> {
    match raw {
        Some(value) if !value.trim().is_empty() => parse_int(name, value),
        _ => Err(missing(name)),
    }
}

/// Optional integer parameter with a default for absent or empty values
pub fn optional_int(name: &str, raw: Option<&str>, default: i64) -> Result<i64> {
    match raw {
        Some(value) if !value.trim().is_empty() => parse_int(name, value),
        _ => Ok(default),
    }
}

fn missing(name: &str) -> Error {
    Error::InvalidInput(format!("Missing required parameter '{}'", name))
}
