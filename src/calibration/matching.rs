//! Which two markers a reference line calibrates.

use serde::Serialize;

/// How a line's marker pair was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingSource {
    /// Both markers share the line's numeric suffix (`Line_2`, `Dist_2`, `Prox_2`)
    Suffix,
    /// Positional: line `i` takes markers `2i` and `2i + 1`
    Order,
    /// Named explicitly by the user
    User,
}

/// A line and the marker pair it calibrates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePairing {
    pub line: String,
    pub markers: [String; 2],
    pub source: PairingSource,
}

/// The numeric token after the last `_` (or space) in a name.
///
/// ```
/// use kvatrack::calibration::numeric_suffix;
///
/// assert_eq!(numeric_suffix("Line_12"), Some("12"));
/// assert_eq!(numeric_suffix("Line 3"), Some("3"));
/// assert_eq!(numeric_suffix("Line_A"), None);
/// assert_eq!(numeric_suffix("Line7"), None);
/// ```
pub fn numeric_suffix(name: &str) -> Option<&str> {
    let (_, token) = name.rsplit_once(['_', ' '])?;
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        Some(token)
    } else {
        None
    }
}

/// Suggest the markers for the `index`-th line.
///
/// Suffix matching wins when exactly two markers carry the line's numeric
/// suffix. Otherwise the markers at positions `2 * index` and `2 * index + 1`
/// in declaration order are used. Returns `None` when neither rule yields a
/// pair.
pub fn suggest_pair(line: &str, index: usize, markers: &[String]) -> Option<LinePairing> {
    if let Some(suffix) = numeric_suffix(line) {
        let matching: Vec<&String> = markers
            .iter()
            .filter(|m| numeric_suffix(m) == Some(suffix))
            .collect();
        if let [first, second] = matching.as_slice() {
            return Some(LinePairing {
                line: line.to_string(),
                markers: [first.to_string(), second.to_string()],
                source: PairingSource::Suffix,
            });
        }
    }

    let pair = markers.get(2 * index..2 * index + 2)?;
    Some(LinePairing {
        line: line.to_string(),
        markers: [pair[0].clone(), pair[1].clone()],
        source: PairingSource::Order,
    })
}
