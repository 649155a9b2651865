//! Timestamp parsing for `UserTime` attributes.
//!
//! Kinovea writes the user-facing time of each track point with a precision
//! that grows with the position in the video:
//!
//! ```text
//! 12.5            <- seconds
//! 01:02.250       <- minutes:seconds
//! 0101:02.250     <- fused hours and minutes (HHMM:SS.fff)
//! 1:01:02.250     <- hours:minutes:seconds
//! ```
//!
//! All forms are converted to seconds as `f64`.

use crate::error::{ExtractError, Result};

/// Parse a `UserTime` value into seconds.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedTimestamp`] when the value has more than
/// two colons, an empty component, or a component that is not a number.
///
/// # Example
///
/// ```
/// use kvatrack::annotation::parse_timestamp;
///
/// assert_eq!(parse_timestamp("12.5").unwrap(), 12.5);
/// assert_eq!(parse_timestamp("01:02.250").unwrap(), 62.25);
/// assert_eq!(parse_timestamp("0101:02.250").unwrap(), 3662.25);
/// ```
pub fn parse_timestamp(value: &str) -> Result<f64> {
    let malformed = || ExtractError::MalformedTimestamp {
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let seconds = match parts.as_slice() {
        [seconds] => parse_seconds(seconds).ok_or_else(malformed)?,
        [minutes, seconds] => {
            let (hours, minutes) = split_fused_minutes(minutes).ok_or_else(malformed)?;
            let seconds = parse_seconds(seconds).ok_or_else(malformed)?;
            hours * 3600.0 + minutes * 60.0 + seconds
        }
        [hours, minutes, seconds] => {
            let hours = parse_whole(hours).ok_or_else(malformed)?;
            let minutes = parse_whole(minutes).ok_or_else(malformed)?;
            let seconds = parse_seconds(seconds).ok_or_else(malformed)?;
            hours * 3600.0 + minutes * 60.0 + seconds
        }
        _ => return Err(malformed()),
    };

    Ok(sign * seconds)
}

/// Split a minutes field that may carry fused hour digits (`HHMM`).
fn split_fused_minutes(field: &str) -> Option<(f64, f64)> {
    if field.len() <= 2 {
        return Some((0.0, parse_whole(field)?));
    }
    let (hours, minutes) = field.split_at(field.len() - 2);
    Some((parse_whole(hours)?, parse_whole(minutes)?))
}

fn parse_whole(field: &str) -> Option<f64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<u64>().ok().map(|v| v as f64)
}

fn parse_seconds(field: &str) -> Option<f64> {
    if field.is_empty() || field.starts_with('-') || field.starts_with('+') {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}
