//! Sharpe ratio

use crate::common::math;

/// Mean excess return divided by the sample standard deviation of excess
/// returns.
///
/// `None` with fewer than two returns or zero variance.
pub fn calculate_sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let mean_excess = math::mean(&excess)?;
    let std_dev = math::sample_standard_deviation(&excess)?;
    if std_dev == 0.0 {
        return None;
    }

    Some(mean_excess / std_dev)
}

/// Sharpe ratio of the simple per-step returns of a price series.
///
/// `window` limits the computation to the trailing returns when set.
pub fn calculate_sharpe_from_prices(
    prices: &[f64],
    risk_free_rate: f64,
    window: Option<usize>,
) -> Option<f64> {
    let returns = math::simple_returns(prices);
    let returns = match window {
        Some(w) => math::trailing(&returns, w)?,
        None => &returns[..],
    };
    calculate_sharpe_ratio(returns, risk_free_rate)
}
