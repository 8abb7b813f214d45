//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::BollingerBandsIndicator;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * population standard deviation)
/// Lower Band = Middle - (std_dev * population standard deviation)
pub fn calculate_bollinger_bands(
    closes: &[f64],
    period: usize,
    std_dev: f64,
) -> Option<BollingerBandsIndicator> {
    if !std_dev.is_finite() {
        return None;
    }

    let middle = math::sma(closes, period)?;
    let std = math::standard_deviation(closes, period)?;

    Some(BollingerBandsIndicator {
        upper: middle + std_dev * std,
        middle,
        lower: middle - std_dev * std,
        period,
        std_dev,
    })
}
