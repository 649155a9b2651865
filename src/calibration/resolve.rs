//! Parsing calibration answers.
//!
//! Each function turns one answer string into a value or a recoverable
//! [`ExtractError`], so the same rules apply to terminal answers and to
//! command-line overrides.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{ExtractError, Result};

/// A physical length with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Length {
    pub value: f64,
    pub unit: String,
}

impl Length {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Answers given ahead of time, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct CalibrationAnswers {
    /// True length per line name
    pub line_lengths: HashMap<String, Length>,
    /// Marker pair per line name, as typed (`"A,B"`)
    pub pairs: HashMap<String, String>,
    /// Apply a tool calibration to more than two markers without asking
    pub confirm_tool_scale: bool,
}

/// Parse `"<value> <unit>"`, e.g. `"10 mm"`. An empty answer takes `default`.
pub fn parse_length_answer(answer: &str, default: &Length) -> Result<Length> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default.clone());
    }

    let invalid = || ExtractError::InvalidAnswer {
        answer: answer.to_string(),
        expected: "a positive length with a unit, separated by a space (e.g. 10 mm)".to_string(),
    };

    let mut parts = answer.split_whitespace();
    let value = parts
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(invalid)?;
    let unit = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(Length::new(value, unit))
}

/// Parse `"A,B"` naming two markers. An empty answer takes `suggestion`.
pub fn parse_pair_answer(
    answer: &str,
    suggestion: &[String; 2],
    known: &[String],
) -> Result<[String; 2]> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(suggestion.clone());
    }

    let names: Vec<&str> = answer.split(',').map(str::trim).collect();
    let (first, second) = match names.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => (*first, *second),
        _ => {
            return Err(ExtractError::InvalidAnswer {
                answer: answer.to_string(),
                expected: "two marker names separated by a comma".to_string(),
            })
        }
    };
    if first == second {
        return Err(ExtractError::InvalidAnswer {
            answer: answer.to_string(),
            expected: "two different markers".to_string(),
        });
    }

    for name in [first, second] {
        if !known.iter().any(|k| k == name) {
            return Err(ExtractError::UnknownMarker {
                name: name.to_string(),
                known: known.join(", "),
            });
        }
    }

    Ok([first.to_string(), second.to_string()])
}

/// Split a `LINE=VALUE` override into the line name and the value.
pub fn split_override(text: &str) -> Result<(&str, &str)> {
    text.split_once('=')
        .map(|(line, value)| (line.trim(), value.trim()))
        .filter(|(line, _)| !line.is_empty())
        .ok_or_else(|| ExtractError::InvalidAnswer {
            answer: text.to_string(),
            expected: "LINE=VALUE".to_string(),
        })
}
