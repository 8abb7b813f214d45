//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::MacdIndicator;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of the MACD series
/// Histogram = MACD - Signal
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdIndicator> {
    if fast_period == 0 || signal_period == 0 || fast_period >= slow_period {
        return None;
    }
    if closes.len() < slow_period + signal_period {
        return None;
    }

    let fast = math::ema_series(closes, fast_period)?;
    let slow = math::ema_series(closes, slow_period)?;

    // Align both series on the input index where the slow EMA starts.
    let offset = slow_period - fast_period;
    let macd_values: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast[i + offset] - slow_value)
        .collect();

    let macd_line = *macd_values.last()?;
    let signal_line = math::ema(&macd_values, signal_period)?;

    Some(MacdIndicator {
        macd: macd_line,
        signal: signal_line,
        histogram: macd_line - signal_line,
    })
}
