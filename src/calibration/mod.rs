//! Turning normalized marker coordinates into physical units.
//!
//! Three modes exist, chosen by [`plan`] from what the annotation contains:
//!
//! | Tool calibration | Lines         | Mode                          |
//! |------------------|---------------|-------------------------------|
//! | scale != 1       | any           | [`CalibrationMode::Tool`]     |
//! | absent or == 1   | markers / 2   | [`CalibrationMode::LinePerPair`] |
//! | absent or == 1   | 1             | [`CalibrationMode::SingleLine`]  |
//! | absent or == 1   | anything else | unsupported, run aborts       |
//!
//! With a line per pair, each line's scale (true length over pixel length)
//! only touches the two markers it is paired with. Otherwise one scale is
//! multiplied into every marker column.
//!
//! Scales are applied to already-normalized columns. Since they are derived
//! from pixel geometry, the table must be denormalized afterwards to land in
//! physical units.
//!
//! # Structure
//!
//! - `matching` - Suggesting the marker pair for a line
//! - `resolve` - Parsing length and pair answers

mod matching;
mod resolve;

use serde::Serialize;
use tracing::{info, warn};

pub use matching::{numeric_suffix, suggest_pair, LinePairing, PairingSource};
pub use resolve::{
    parse_length_answer, parse_pair_answer, split_override, CalibrationAnswers, Length,
};

use crate::annotation::{DrawnLine, ToolCalibration};
use crate::error::{ExtractError, Result};
use crate::prompt::{ask_until_valid, parse_confirmation, InputSource};
use crate::tracks::AlignedTable;

/// Default true lengths offered for manual calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSettings {
    /// Default for each line in per-pair mode
    pub pair_line: Length,
    /// Default for the single global line
    pub single_line: Length,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            pair_line: Length::new(9.5, "mm"),
            single_line: Length::new(10.0, "mm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    Tool,
    LinePerPair,
    SingleLine,
}

/// The calibration mode an annotation calls for.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationPlan {
    Tool(ToolCalibration),
    LinePerPair,
    SingleLine,
}

impl CalibrationPlan {
    pub fn mode(&self) -> CalibrationMode {
        match self {
            CalibrationPlan::Tool(_) => CalibrationMode::Tool,
            CalibrationPlan::LinePerPair => CalibrationMode::LinePerPair,
            CalibrationPlan::SingleLine => CalibrationMode::SingleLine,
        }
    }
}

/// Choose the calibration mode.
///
/// # Errors
///
/// [`ExtractError::UnsupportedCalibrationTopology`] when manual calibration
/// is needed but the line count fits neither manual mode, and
/// [`ExtractError::ZeroLengthLine`] when a line to calibrate with has
/// coinciding endpoints.
pub fn plan(
    tool: Option<&ToolCalibration>,
    lines: &[DrawnLine],
    markers: usize,
) -> Result<CalibrationPlan> {
    if let Some(tool) = tool.filter(|t| !t.is_sentinel()) {
        return Ok(CalibrationPlan::Tool(tool.clone()));
    }

    let plan = if !lines.is_empty() && 2 * lines.len() == markers {
        CalibrationPlan::LinePerPair
    } else if lines.len() == 1 {
        CalibrationPlan::SingleLine
    } else {
        return Err(ExtractError::UnsupportedCalibrationTopology {
            lines: lines.len(),
            markers,
        });
    };

    if let Some(line) = lines.iter().find(|l| l.pixel_length == 0.0) {
        return Err(ExtractError::ZeroLengthLine {
            name: line.name.clone(),
        });
    }
    Ok(plan)
}

/// What calibration did to the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub mode: CalibrationMode,
    /// Unit the marker columns end up in
    pub unit: String,
    /// The tool calibration, in tool mode
    pub tool: Option<ToolCalibration>,
    /// Line-to-marker pairs, in per-pair mode
    pub pairings: Vec<LinePairing>,
    /// Number of lines used, in the manual modes
    pub line_count: usize,
}

impl CalibrationOutcome {
    /// Description lines for the report header.
    pub fn narrative(&self) -> Vec<String> {
        match (&self.mode, &self.tool) {
            (CalibrationMode::Tool, Some(tool)) => vec![
                format!(
                    "Automatic calibration with factor {} {}/px from the annotation was applied to all the markers.",
                    tool.scale, tool.unit
                ),
                "Note the calibrated data assume one scale for all markers. Origin is bottom-left, X rightwards, Y upwards.".to_string(),
            ],
            _ => vec![format!(
                "Calibration was manual via {} line(s), details below, line coordinates normalized (marker coordinates are calibrated), origin bottom-left, X rightwards, Y upwards.",
                self.line_count
            )],
        }
    }

    /// Whether the report carries the line table.
    pub fn is_manual(&self) -> bool {
        self.mode != CalibrationMode::Tool
    }
}

/// Calibrate the table in place.
///
/// `lines` must already be normalized; their true lengths and units are
/// filled in by the manual modes. Answers are taken from `answers` first
/// and asked from `input` otherwise. Answers from `answers` are never asked
/// again: a bad one is fatal.
pub fn calibrate(
    table: &mut AlignedTable,
    lines: &mut [DrawnLine],
    tool: Option<&ToolCalibration>,
    settings: &CalibrationSettings,
    answers: &CalibrationAnswers,
    input: &mut dyn InputSource,
) -> Result<CalibrationOutcome> {
    match plan(tool, lines, table.marker_count())? {
        CalibrationPlan::Tool(tool) => apply_tool_scale(table, tool, answers, input),
        CalibrationPlan::LinePerPair => calibrate_pairs(table, lines, settings, answers, input),
        CalibrationPlan::SingleLine => calibrate_single(table, lines, settings, answers, input),
    }
}

fn apply_tool_scale(
    table: &mut AlignedTable,
    tool: ToolCalibration,
    answers: &CalibrationAnswers,
    input: &mut dyn InputSource,
) -> Result<CalibrationOutcome> {
    let count = table.marker_count();
    input.say(&format!(
        "Calibration from the annotation detected with factor {} {}/px.",
        tool.scale, tool.unit
    ));

    if count > 2 && !answers.confirm_tool_scale {
        let prompt = format!(
            "{} markers detected: {}. They may come from video sources with different scales; \
             a line per marker pair is safer. Calibrate all markers by the same factor? [y/N]",
            count,
            table.marker_names().join(", ")
        );
        let confirmed = ask_until_valid(&mut *input, &prompt, |answer| {
            Ok(parse_confirmation(answer))
        })?;
        if !confirmed {
            return Err(ExtractError::CalibrationDeclined { markers: count });
        }
    }

    table.scale_all(tool.scale);
    info!(scale = tool.scale, unit = %tool.unit, markers = count, "applied tool calibration");

    Ok(CalibrationOutcome {
        mode: CalibrationMode::Tool,
        unit: tool.unit.clone(),
        tool: Some(tool),
        pairings: Vec::new(),
        line_count: 0,
    })
}

/// True length for a line, from the overrides or by asking.
fn resolve_length(
    line: &DrawnLine,
    default: &Length,
    answers: &CalibrationAnswers,
    input: &mut dyn InputSource,
) -> Result<Length> {
    if let Some(length) = answers.line_lengths.get(&line.name) {
        return Ok(length.clone());
    }
    let prompt = format!(
        "True length of {} at ({:.2}, {:.2}), {:.1} px, with unit [{}]:",
        line.name, line.center_x, line.center_y, line.pixel_length, default
    );
    ask_until_valid(input, &prompt, |answer| parse_length_answer(answer, default))
}

fn assign_length(line: &mut DrawnLine, length: Length) -> f64 {
    line.true_length = Some(length.value);
    line.unit = Some(length.unit);
    length.value / line.pixel_length
}

fn unclaimed(pair: [String; 2], claimed: &[String], answer: &str) -> Result<[String; 2]> {
    match pair.iter().find(|name| claimed.contains(name)) {
        Some(name) => Err(ExtractError::InvalidAnswer {
            answer: answer.to_string(),
            expected: format!("markers not calibrated by another line ({} is)", name),
        }),
        None => Ok(pair),
    }
}

fn calibrate_pairs(
    table: &mut AlignedTable,
    lines: &mut [DrawnLine],
    settings: &CalibrationSettings,
    answers: &CalibrationAnswers,
    input: &mut dyn InputSource,
) -> Result<CalibrationOutcome> {
    let markers: Vec<String> = table.marker_names().iter().map(|s| s.to_string()).collect();

    let mut scales = Vec::with_capacity(lines.len());
    for line in lines.iter_mut() {
        let length = resolve_length(line, &settings.pair_line, answers, &mut *input)?;
        scales.push(assign_length(line, length));
    }

    let mut claimed: Vec<String> = Vec::with_capacity(markers.len());
    let mut pairings = Vec::with_capacity(lines.len());
    for (index, (line, scale)) in lines.iter().zip(&scales).enumerate() {
        let suggestion = suggest_pair(&line.name, index, &markers).ok_or(
            ExtractError::UnsupportedCalibrationTopology {
                lines: scales.len(),
                markers: markers.len(),
            },
        )?;

        let (pair, source) = match answers.pairs.get(&line.name) {
            Some(raw) => {
                let pair = parse_pair_answer(raw, &suggestion.markers, &markers)?;
                (unclaimed(pair, &claimed, raw)?, PairingSource::User)
            }
            None => {
                let hint = match suggestion.source {
                    PairingSource::Suffix => "matching number in the names",
                    _ => "order of lines and markers",
                };
                let prompt = format!(
                    "Markers calibrated by {} [{},{}] (suggested by {}). Enter to accept or type two names comma-separated:",
                    line.name, suggestion.markers[0], suggestion.markers[1], hint
                );
                let pair = ask_until_valid(&mut *input, &prompt, |answer| {
                    let pair = parse_pair_answer(answer, &suggestion.markers, &markers)?;
                    unclaimed(pair, &claimed, answer)
                })?;
                let source = if pair == suggestion.markers {
                    suggestion.source
                } else {
                    PairingSource::User
                };
                (pair, source)
            }
        };

        for name in &pair {
            if let Some(columns) = table.marker_mut(name) {
                columns.scale(*scale);
            }
        }
        info!(line = %line.name, markers = ?pair, scale, "calibrated marker pair");

        claimed.extend(pair.iter().cloned());
        pairings.push(LinePairing {
            line: line.name.clone(),
            markers: pair,
            source,
        });
    }

    let unit = last_unit(lines);
    Ok(CalibrationOutcome {
        mode: CalibrationMode::LinePerPair,
        unit,
        tool: None,
        pairings,
        line_count: lines.len(),
    })
}

fn calibrate_single(
    table: &mut AlignedTable,
    lines: &mut [DrawnLine],
    settings: &CalibrationSettings,
    answers: &CalibrationAnswers,
    input: &mut dyn InputSource,
) -> Result<CalibrationOutcome> {
    let line = &mut lines[0];
    input.say("A single line will be used to calibrate all the markers' positions.");
    let length = resolve_length(line, &settings.single_line, answers, input)?;
    let scale = assign_length(line, length);

    table.scale_all(scale);
    info!(line = %line.name, scale, "calibrated all markers with one line");

    Ok(CalibrationOutcome {
        mode: CalibrationMode::SingleLine,
        unit: last_unit(lines),
        tool: None,
        pairings: Vec::new(),
        line_count: 1,
    })
}

/// Unit of the marker data: the last line's unit.
fn last_unit(lines: &[DrawnLine]) -> String {
    let units: Vec<&str> = lines.iter().filter_map(|l| l.unit.as_deref()).collect();
    if units.windows(2).any(|w| w[0] != w[1]) {
        warn!(units = ?units, "lines use different units, reporting the last one");
    }
    units.last().map(|u| u.to_string()).unwrap_or_default()
}
