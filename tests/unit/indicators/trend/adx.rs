//! Unit tests for ADX indicator

use pricewatch::indicators::trend::{calculate_adx};

fn trending(count: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64).collect();
    let highs = closes.iter().map(|c| c + 0.5).collect();
    let lows = closes.iter().map(|c| c - 0.5).collect();
    (highs, lows, closes)
}

#[test]
fn test_adx_insufficient_data() {
    let (highs, lows, closes) = trending(27);
    assert!(calculate_adx(&highs, &lows, &closes, 14).is_none());
}

#[test]
fn test_adx_strong_uptrend() {
    let (highs, lows, closes) = trending(40);
    let adx = calculate_adx(&highs, &lows, &closes, 14).unwrap();
    assert!(adx.plus_di > adx.minus_di);
    assert_eq!(adx.minus_di, 0.0);
    assert!((adx.adx - 100.0).abs() < 1e-9);
    assert_eq!(adx.period, 14);
}

#[test]
fn test_adx_flat_market_is_zero() {
    let flat = vec![10.0; 30];
    let adx = calculate_adx(&flat, &flat, &flat, 14).unwrap();
    assert_eq!(adx.adx, 0.0);
}

#[test]
fn test_adx_requires_aligned_series() {
    let (highs, lows, closes) = trending(40);
    assert!(calculate_adx(&highs[1..], &lows, &closes, 14).is_none());
}
