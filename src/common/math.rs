//! Numeric primitives over oldest-first series.
//!
//! Every helper returns `None` instead of dividing by zero or reading past the
//! start of a series, so callers never see NaN or infinity from here.

/// Arithmetic mean of the whole slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Trailing `period` values of a series, or `None` if the series is shorter.
pub fn trailing(values: &[f64], period: usize) -> Option<&[f64]> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(&values[values.len() - period..])
}

/// Simple moving average over the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    mean(trailing(values, period)?)
}

/// Population standard deviation over the trailing `period` values.
pub fn standard_deviation(values: &[f64], period: usize) -> Option<f64> {
    let window = trailing(values, period)?;
    let avg = mean(window)?;
    let variance = window.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// Sample standard deviation (N-1 denominator) of the whole slice.
pub fn sample_standard_deviation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Next EMA value given the previous one.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = 2.0 / (period as f64 + 1.0);
    value * k + previous * (1.0 - k)
}

/// EMA series seeded with the SMA of the first `period` values.
///
/// Element `i` of the result is the EMA as of input index `period - 1 + i`.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let seed = mean(&values[..period])?;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);
    let mut previous = seed;
    for &value in &values[period..] {
        previous = ema_from_previous(value, previous, period);
        series.push(previous);
    }
    Some(series)
}

/// Latest EMA value of the series.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period)?.last().copied()
}

/// True range of a bar given the previous close.
pub fn true_range(high: f64, low: f64, previous_close: f64) -> f64 {
    (high - low)
        .max((high - previous_close).abs())
        .max((low - previous_close).abs())
}

/// Simple per-step returns of a price series; steps from a zero price are skipped.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}
