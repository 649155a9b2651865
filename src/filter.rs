//! Zero-phase low-pass filtering of marker columns.
//!
//! A single second-order Butterworth section (coefficients from the `biquad`
//! crate) is run forward and then backward over each coordinate column, which
//! cancels the phase shift and squares the magnitude response.
//!
//! Edge handling:
//!
//! - The signal is extended at both ends by an odd reflection about its end
//!   values, `min(50, n / 10)` samples long.
//! - Each pass starts from the steady state for its first input value, so a
//!   constant signal passes through unchanged.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F64};
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::tracks::{AlignedTable, Axis};

/// Upper bound on the edge extension length.
pub const MAX_PAD_LEN: usize = 50;

/// Check that `cutoff` lies strictly between 0 and the Nyquist frequency.
pub fn validate_cutoff(cutoff: f64, sample_rate: f64) -> Result<f64> {
    let normalized = 2.0 * cutoff / sample_rate;
    if cutoff.is_finite() && normalized > 0.0 && normalized < 1.0 {
        Ok(cutoff)
    } else {
        Err(ExtractError::InvalidCutoffFrequency {
            cutoff,
            nyquist: sample_rate / 2.0,
        })
    }
}

/// Parse a cutoff answer. An empty answer takes `default`.
pub fn parse_cutoff_answer(answer: &str, default: f64, sample_rate: f64) -> Result<f64> {
    let answer = answer.trim();
    if answer.is_empty() {
        return validate_cutoff(default, sample_rate);
    }
    let cutoff = answer
        .parse::<f64>()
        .map_err(|_| ExtractError::InvalidAnswer {
            answer: answer.to_string(),
            expected: "a cutoff frequency in Hz, without units".to_string(),
        })?;
    validate_cutoff(cutoff, sample_rate)
}

/// Edge extension length for a signal of `len` samples.
pub fn pad_len(len: usize) -> usize {
    (len / 10).min(MAX_PAD_LEN)
}

/// Extend `signal` by `n` samples at each end, reflected oddly about the
/// end values.
///
/// `n` must be smaller than `signal.len()`.
pub fn odd_extend(signal: &[f64], n: usize) -> Vec<f64> {
    if n == 0 || signal.len() < 2 {
        return signal.to_vec();
    }
    let first = signal[0];
    let last = signal[signal.len() - 1];
    let len = signal.len();

    let mut extended = Vec::with_capacity(len + 2 * n);
    extended.extend((1..=n).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=n).map(|i| 2.0 * last - signal[len - 1 - i]));
    extended
}

/// Second-order Butterworth low-pass, applied forward and backward.
#[derive(Debug, Clone, Copy)]
pub struct LowPass {
    cutoff: f64,
    sample_rate: f64,
    coeffs: Coefficients<f64>,
}

impl LowPass {
    pub fn new(cutoff: f64, sample_rate: f64) -> Result<Self> {
        validate_cutoff(cutoff, sample_rate)?;
        let coeffs = Coefficients::<f64>::from_params(
            Type::LowPass,
            sample_rate.hz(),
            cutoff.hz(),
            Q_BUTTERWORTH_F64,
        )
        .map_err(|_| ExtractError::InvalidCutoffFrequency {
            cutoff,
            nyquist: sample_rate / 2.0,
        })?;

        Ok(Self {
            cutoff,
            sample_rate,
            coeffs,
        })
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Filter a gap-free signal with zero phase shift.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        if signal.len() < 2 {
            return signal.to_vec();
        }

        let pad = pad_len(signal.len());
        let extended = odd_extend(signal, pad);

        let mut forward = self.run_from_steady_state(&extended);
        forward.reverse();
        let mut backward = self.run_from_steady_state(&forward);
        backward.reverse();

        backward[pad..pad + signal.len()].to_vec()
    }

    /// Gain of the section at 0 Hz.
    fn dc_gain(&self) -> f64 {
        let c = &self.coeffs;
        (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2)
    }

    /// One pass, as if the input had been at `signal[0]` forever before.
    ///
    /// Filtering `x - x0` from rest and adding the settled response to `x0`
    /// is the same as starting the section in its steady state.
    fn run_from_steady_state(&self, signal: &[f64]) -> Vec<f64> {
        let Some(&x0) = signal.first() else {
            return Vec::new();
        };
        let settled = self.dc_gain() * x0;
        let mut section = DirectForm2Transposed::<f64>::new(self.coeffs);
        signal
            .iter()
            .map(|x| section.run(x - x0) + settled)
            .collect()
    }
}

/// Filter one column, treating each run of present values separately.
///
/// Null cells stay null and split the column into independent segments.
pub fn filter_column(filter: &LowPass, column: &mut [Option<f64>]) {
    let mut start = 0;
    while start < column.len() {
        if column[start].is_none() {
            start += 1;
            continue;
        }
        let end = column[start..]
            .iter()
            .position(Option::is_none)
            .map_or(column.len(), |offset| start + offset);

        let run: Vec<f64> = column[start..end].iter().flatten().copied().collect();
        for (cell, value) in column[start..end].iter_mut().zip(filter.filtfilt(&run)) {
            *cell = Some(value);
        }
        start = end;
    }
}

/// Filter every coordinate column of the table in place. Time is untouched.
pub fn filter_table(table: &mut AlignedTable, filter: &LowPass) {
    for marker in table.markers_mut() {
        for axis in [Axis::X, Axis::Y] {
            filter_column(filter, marker.column_mut(axis));
        }
        debug!(marker = %marker.name, cutoff = filter.cutoff(), "filtered");
    }
}
