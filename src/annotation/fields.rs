//! Line-level cues and field extraction for `.kva` markup.
//!
//! The scanner never builds a document tree. It looks for short, fixed
//! substrings ("cues") in each line and pulls the few numeric fields it needs
//! out of the same line with the helpers below.

/// Opens a marker track region and declares its name.
pub const TRACK_OPEN: &str = "<Track id=";
/// Closes a marker track region; the buffered samples are merged.
pub const TRACK_CLOSE: &str = "/TrackPointList";
/// A per-frame marker sample.
pub const TRACK_POINT: &str = "TrackPoint UserX";

/// Opens a drawn line region and declares its name.
pub const LINE_OPEN: &str = "Line id=";
/// Closes a drawn line region.
pub const LINE_CLOSE: &str = "/Line";
/// Closes a drawings section; the line table is committed.
pub const DRAWINGS_CLOSE: &str = "</Drawings>";
/// First endpoint of a drawn segment.
pub const SEGMENT_START: &str = "<Start>";
/// Second endpoint of a drawn segment.
pub const SEGMENT_END: &str = "<End>";

/// Opens the calibration block.
pub const CALIBRATION_OPEN: &str = "<Calibration>";
/// Closes the calibration block.
pub const CALIBRATION_CLOSE: &str = "</Calibration>";
/// Known physical length of the calibration segment.
pub const CALIBRATION_LENGTH: &str = "<Length>";
/// First calibration endpoint.
pub const CALIBRATION_A: &str = "<A>";
/// Second calibration endpoint.
pub const CALIBRATION_B: &str = "<B>";
/// Unit of the calibration length.
pub const CALIBRATION_UNIT: &str = "Unit Abbreviation";

/// Header element holding `width;height` in pixels.
pub const IMAGE_SIZE: &str = "<ImageSize>";
/// Header element holding the capture framerate.
pub const CAPTURE_FRAMERATE: &str = "<CaptureFramerate>";

/// Value of a double-quoted attribute, e.g. `name` in `name="Dist_1"`.
///
/// The attribute name must start at a word boundary, so `UserX` does not
/// match inside `UserXInvariant` and `name` does not match inside `filename`.
pub fn attribute<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let mut offset = 0;
    while let Some(pos) = line[offset..].find(&needle) {
        let start = offset + pos;
        let boundary = line[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric() && c != '_');
        let value_start = start + needle.len();
        if boundary {
            let len = line[value_start..].find('"')?;
            return Some(&line[value_start..value_start + len]);
        }
        offset = value_start;
    }
    None
}

/// Text content of an element opened on this line, e.g. `12` in
/// `<Length>12</Length>` or `Millimeters` in `<Unit Abbreviation="mm">Millimeters</Unit>`.
///
/// `tag` is the element name without brackets. Attributes on the opening tag
/// are skipped; the text runs to the next `<` or the end of the line.
pub fn element_text<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}", tag);
    let mut offset = 0;
    while let Some(pos) = line[offset..].find(&open) {
        let after_name = offset + pos + open.len();
        match line[after_name..].chars().next() {
            Some('>') | Some(' ') | Some('\t') => {
                let gt = line[after_name..].find('>')?;
                let text_start = after_name + gt + 1;
                let text_end = line[text_start..]
                    .find('<')
                    .map_or(line.len(), |p| text_start + p);
                return Some(line[text_start..text_end].trim());
            }
            _ => offset = after_name,
        }
    }
    None
}

/// Parse a scalar field, rejecting NaN and infinities.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an `x;y` (or `x,y`) coordinate pair.
///
/// Semicolons take precedence so a comma can never split a value that uses
/// a semicolon separator.
pub fn parse_pair(text: &str) -> Option<(f64, f64)> {
    let separator = if text.contains(';') { ';' } else { ',' };
    let mut parts = text.split(separator);
    let x = parse_number(parts.next()?)?;
    let y = parse_number(parts.next()?)?;
    Some((x, y))
}
