//! Unit tests for Pearson correlation

use pricewatch::indicators::statistics::{calculate_correlation};

#[test]
fn test_perfect_positive_and_negative() {
    let a = [1.0, 2.0, 3.0, 4.0];
    let b = [2.0, 4.0, 6.0, 8.0];
    let c = [8.0, 6.0, 4.0, 2.0];
    assert!((calculate_correlation(&a, &b, 4).unwrap() - 1.0).abs() < 1e-12);
    assert!((calculate_correlation(&a, &c, 4).unwrap() + 1.0).abs() < 1e-12);
}

#[test]
fn test_correlation_uses_trailing_window() {
    let a = [100.0, -50.0, 1.0, 2.0, 3.0];
    let b = [0.0, 1.0, 2.0, 3.0];
    assert!((calculate_correlation(&a, &b, 3).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_correlation_zero_variance_is_none() {
    assert!(calculate_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 3).is_none());
}

#[test]
fn test_correlation_insufficient_data() {
    let a: Vec<f64> = (0..19).map(|i| i as f64).collect();
    assert!(calculate_correlation(&a, &a, 20).is_none());
}
