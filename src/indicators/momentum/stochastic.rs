//! Stochastic oscillator

use crate::models::indicators::StochasticIndicator;

fn percent_k(closes: &[f64], highs: &[f64], lows: &[f64], end: usize, k_period: usize) -> Option<f64> {
    let start = end + 1 - k_period;
    let highest = highs[start..=end].iter().copied().fold(f64::MIN, f64::max);
    let lowest = lows[start..=end].iter().copied().fold(f64::MAX, f64::min);
    let range = highest - lowest;
    if range == 0.0 {
        return None;
    }
    Some(100.0 * (closes[end] - lowest) / range)
}

/// Calculate %K over the trailing `k_period` bars and %D as the simple
/// average of the last `d_period` %K values.
///
/// Returns `None` when any of the windows has a flat high/low range.
pub fn calculate_stochastic(
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    k_period: usize,
    d_period: usize,
) -> Option<StochasticIndicator> {
    if k_period == 0 || d_period == 0 {
        return None;
    }
    if highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }
    if closes.len() < k_period + d_period - 1 {
        return None;
    }

    let last = closes.len() - 1;
    let mut k_values = Vec::with_capacity(d_period);
    for end in (last + 1 - d_period)..=last {
        k_values.push(percent_k(closes, highs, lows, end, k_period)?);
    }

    let k = *k_values.last()?;
    let d = k_values.iter().sum::<f64>() / d_period as f64;

    Some(StochasticIndicator { k, d })
}
