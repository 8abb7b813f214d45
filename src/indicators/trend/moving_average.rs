//! Simple moving averages

use crate::common::math;
use crate::models::indicators::MovingAverageCross;

/// SMA over the trailing `period` closes
pub fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    math::sma(closes, period)
}

/// Short and long SMAs side by side, for cross detection
///
/// Needs at least `long_period` closes.
pub fn calculate_ma_cross(
    closes: &[f64],
    short_period: usize,
    long_period: usize,
) -> Option<MovingAverageCross> {
    let short = calculate_sma(closes, short_period)?;
    let long = calculate_sma(closes, long_period)?;
    Some(MovingAverageCross { short, long })
}
