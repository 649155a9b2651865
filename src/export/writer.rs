//! Plain-text rendering of the tracking report.

use std::io::{self, Write};

use crate::annotation::{round_to, DrawnLine};
use crate::tracks::{column_name, key_time, AlignedTable, Axis};

/// Decimals kept for marker coordinates.
pub const MARKER_DECIMALS: i32 = 4;
/// Decimals kept for line table values.
pub const LINE_DECIMALS: i32 = 2;

/// Header of the line table.
pub const LINE_TABLE_HEADER: [&str; 6] =
    ["Name", "Pixel L", "Center_X", "Center_Y", "Units", "True L"];

/// Format a number rounded to `decimals`, always with a decimal point.
///
/// ```
/// use kvatrack::export::format_value;
///
/// assert_eq!(format_value(73.625, 4), "73.625");
/// assert_eq!(format_value(310.0, 4), "310.0");
/// assert_eq!(format_value(0.123456, 4), "0.1235");
/// ```
pub fn format_value(value: f64, decimals: i32) -> String {
    let rounded = round_to(value, decimals);
    // Keeps -0.0 from printing as "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = rounded.to_string();
    if text.contains('.') || !rounded.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Quote a cell if it would otherwise break the row.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn write_row<W: Write, S: AsRef<str>>(sink: &mut W, cells: &[S]) -> io::Result<()> {
    let row: Vec<String> = cells.iter().map(|c| escape_cell(c.as_ref())).collect();
    writeln!(sink, "{}", row.join(","))
}

/// Write the line table with its header row.
pub fn write_line_table<W: Write>(sink: &mut W, lines: &[DrawnLine]) -> io::Result<()> {
    write_row(sink, &LINE_TABLE_HEADER)?;
    for line in lines {
        let row = [
            line.name.clone(),
            format_value(line.pixel_length, LINE_DECIMALS),
            format_value(line.center_x, LINE_DECIMALS),
            format_value(line.center_y, LINE_DECIMALS),
            line.unit.clone().unwrap_or_default(),
            line.true_length
                .map(|v| format_value(v, LINE_DECIMALS))
                .unwrap_or_default(),
        ];
        write_row(sink, &row)?;
    }
    Ok(())
}

/// Write the coordinate table: `Time` and two columns per marker.
///
/// Null cells are written empty.
pub fn write_marker_table<W: Write>(sink: &mut W, table: &AlignedTable) -> io::Result<()> {
    let mut header = vec!["Time".to_string()];
    for marker in table.markers() {
        header.push(column_name(&marker.name, Axis::X));
        header.push(column_name(&marker.name, Axis::Y));
    }
    write_row(sink, &header)?;

    for (row, key) in table.keys().iter().enumerate() {
        let mut cells = Vec::with_capacity(header.len());
        cells.push(format_value(key_time(*key), 2));
        for marker in table.markers() {
            for axis in [Axis::X, Axis::Y] {
                cells.push(
                    marker.column(axis)[row]
                        .map(|v| format_value(v, MARKER_DECIMALS))
                        .unwrap_or_default(),
                );
            }
        }
        write_row(sink, &cells)?;
    }
    Ok(())
}
