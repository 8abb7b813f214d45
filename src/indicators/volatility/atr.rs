//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::indicators::AtrIndicator;

/// Calculate ATR as the plain average of the trailing `period` true ranges
///
/// Needs `period + 1` bars so every true range has a previous close.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<AtrIndicator> {
    if period == 0 {
        return None;
    }
    if highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }
    if closes.len() < period + 1 {
        return None;
    }

    let start = closes.len() - period;
    let total: f64 = (start..closes.len())
        .map(|i| math::true_range(highs[i], lows[i], closes[i - 1]))
        .sum();

    Some(AtrIndicator {
        value: total / period as f64,
        period,
    })
}
