//! RSI (Relative Strength Index) indicator

use crate::models::indicators::RsiIndicator;

/// Neutral RSI reported when the window has no price movement at all.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Calculate RSI over the trailing `period` close-to-close differences
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// A window with gains but no losses reports 100; a window with neither
/// reports [`NEUTRAL_RSI`].
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<RsiIndicator> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let start = closes.len() - period;
    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in start..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let value = if gains == 0.0 && losses == 0.0 {
        NEUTRAL_RSI
    } else if losses == 0.0 {
        100.0
    } else {
        let avg_gain = gains / period as f64;
        let avg_loss = losses / period as f64;
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    };

    Some(RsiIndicator { value, period })
}
