//! Volume spike detection

use crate::common::math;

/// True iff the latest volume exceeds `threshold_multiplier` times the mean
/// of the `window` volumes before it.
///
/// Returns false when fewer than `window + 1` points are available.
pub fn detect_volume_spike(volumes: &[f64], window: usize, threshold_multiplier: f64) -> bool {
    if window == 0 || volumes.len() < window + 1 {
        return false;
    }

    let latest = volumes[volumes.len() - 1];
    let previous = &volumes[volumes.len() - 1 - window..volumes.len() - 1];
    match math::mean(previous) {
        Some(average) => latest > average * threshold_multiplier,
        None => false,
    }
}

/// Ratio of the latest volume to the mean of the preceding window.
///
/// `None` when there is not enough data or the preceding mean is zero.
pub fn volume_ratio(volumes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || volumes.len() < window + 1 {
        return None;
    }
    let latest = volumes[volumes.len() - 1];
    let average = math::mean(&volumes[volumes.len() - 1 - window..volumes.len() - 1])?;
    if average == 0.0 {
        return None;
    }
    Some(latest / average)
}
