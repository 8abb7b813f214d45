//! Unit tests for the stochastic oscillator

use pricewatch::indicators::momentum::calculate_stochastic;

#[test]
fn test_stochastic_close_at_high_is_100() {
    let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
    let highs = [1.0, 2.0, 3.0, 4.0, 5.0];
    let lows = [0.0, 1.0, 2.0, 3.0, 4.0];
    let stoch = calculate_stochastic(&closes, &highs, &lows, 3, 2).unwrap();
    assert_eq!(stoch.k, 100.0);
    assert_eq!(stoch.d, 100.0);
}

#[test]
fn test_stochastic_d_averages_k() {
    // Last window: high 10, low 0, close 5 → 50; previous: high 10, low 0, close 10 → 100
    let closes = [0.0, 10.0, 5.0];
    let highs = [0.0, 10.0, 10.0];
    let lows = [0.0, 0.0, 0.0];
    let stoch = calculate_stochastic(&closes, &highs, &lows, 2, 2).unwrap();
    assert_eq!(stoch.k, 50.0);
    assert_eq!(stoch.d, 75.0);
}

#[test]
fn test_stochastic_flat_range_is_none() {
    let flat = [3.0; 6];
    assert!(calculate_stochastic(&flat, &flat, &flat, 3, 2).is_none());
}

#[test]
fn test_stochastic_requires_aligned_series() {
    let closes = [1.0, 2.0, 3.0, 4.0];
    assert!(calculate_stochastic(&closes, &closes[..3], &closes, 2, 1).is_none());
    assert!(calculate_stochastic(&closes[..2], &closes[..2], &closes[..2], 2, 2).is_none());
}
