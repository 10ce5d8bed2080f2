//! Rolling-window primitives shared by the indicator modules
//!
//! All windows are trailing and never reach before the start of the series.

use crate::OHLC;

// ============================================================
// COMPARISON
// ============================================================

/// Relative tolerance for "strictly greater" between readings of one series
pub const TOLERANCE: f64 = 1e-9;

/// `a > b` by more than accumulated float noise at the magnitude of `scale`.
/// Exactly-equal readings (constant series) never compare as exceeding.
#[inline]
pub fn exceeds(a: f64, b: f64, scale: f64) -> bool {
    a - b > TOLERANCE * scale.abs().max(1.0)
}

// ============================================================
// SERIES
// ============================================================

#[inline]
pub fn closes<T: OHLC>(bars: &[T]) -> Vec<f64> {
    bars.iter().map(|b| b.close()).collect()
}

/// Mean of the last `period` values, `None` when fewer are available
pub fn trailing_mean(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Population standard deviation (divisor `period`) of the last `period` values
pub fn trailing_std(values: &[f64], period: usize) -> Option<f64> {
    let mean = trailing_mean(values, period)?;
    let window = &values[values.len() - period..];
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// Recursive exponential smoothing `y[t] = (1 - alpha) * y[t-1] + alpha * x[t]`,
/// seeded with `y[0] = x[0]`
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let y = match prev {
            Some(p) => (1.0 - alpha) * p + alpha * x,
            None => x,
        };
        out.push(y);
        prev = Some(y);
    }
    out
}

/// Exponential moving average with span `period` (`alpha = 2 / (period + 1)`)
#[inline]
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    ewm(values, 2.0 / (period as f64 + 1.0))
}

/// `(max high + min low) / 2` over the `period` bars ending at `index`.
/// The window is truncated at the start of the series.
pub fn midpoint<T: OHLC>(bars: &[T], index: usize, period: usize) -> Option<f64> {
    if index >= bars.len() || period == 0 {
        return None;
    }
    let start = (index + 1).saturating_sub(period);
    let window = &bars[start..=index];

    let max_high = window.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max);
    let min_low = window.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min);
    Some((max_high + min_low) / 2.0)
}
