//! Pearson correlation between two series

use crate::common::math;

/// Pearson correlation coefficient over the trailing `window` of both series.
///
/// `None` when either series is shorter than the window or either window has
/// zero variance.
pub fn calculate_correlation(series_a: &[f64], series_b: &[f64], window: usize) -> Option<f64> {
    let a = math::trailing(series_a, window)?;
    let b = math::trailing(series_b, window)?;
    let mean_a = math::mean(a)?;
    let mean_b = math::mean(b)?;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return None;
    }

    Some(covariance / (variance_a * variance_b).sqrt())
}
