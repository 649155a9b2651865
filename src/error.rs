//! Error taxonomy for annotation extraction.
//!
//! Every failure a run can hit is one variant of [`ExtractError`]. Most are
//! fatal: the run stops and nothing is written. A few describe a bad answer to
//! a prompt and can be retried; see [`ExtractError::is_recoverable`].

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while turning a `.kva` file into a tracking table.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Malformed timestamp '{value}'")]
    MalformedTimestamp { value: String },

    #[error("Malformed annotation line {line}: {reason}")]
    MalformedAnnotationLine { line: usize, reason: String },

    #[error("Annotation header is missing <{field}>")]
    MissingHeaderField { field: &'static str },

    #[error("Marker name '{name}' is used by more than one track")]
    DuplicateMarkerName { name: String },

    #[error("No marker tracks found in the annotation")]
    NoMarkerTracks,

    #[error(
        "Unsupported calibration: {lines} line(s) for {markers} marker(s). \
         Use a single line for all markers or one line per marker pair."
    )]
    UnsupportedCalibrationTopology { lines: usize, markers: usize },

    #[error("Line '{name}' has zero pixel length and cannot calibrate markers")]
    ZeroLengthLine { name: String },

    #[error("Uniform tool calibration of {markers} markers was declined")]
    CalibrationDeclined { markers: usize },

    #[error(
        "Cutoff frequency {cutoff} Hz must be between 0 and half the sampling rate ({nyquist} Hz)"
    )]
    InvalidCutoffFrequency { cutoff: f64, nyquist: f64 },

    #[error("Could not understand '{answer}', expected {expected}")]
    InvalidAnswer { answer: String, expected: String },

    #[error("Unknown marker '{name}'. Known markers: {known}")]
    UnknownMarker { name: String, known: String },

    #[error("Column mapping lists {found} marker(s) but the table has {expected}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Invalid column mapping: {0}")]
    InvalidColumnMapping(String),

    #[error("Input ended before a valid answer was given for: {prompt}")]
    InputExhausted { prompt: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether asking again could fix this error.
    ///
    /// Only errors caused by a single bad answer qualify. Everything else
    /// aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidCutoffFrequency { .. }
                | ExtractError::InvalidAnswer { .. }
                | ExtractError::UnknownMarker { .. }
        )
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        ExtractError::MalformedAnnotationLine {
            line,
            reason: reason.into(),
        }
    }
}
