//! Unit tests for condition evaluation and edge detection

use chrono::{Duration, Utc};
use pricewatch::alerts::{apply_edge, compose_message, evaluate, Observation};
use pricewatch::indicators::IndicatorError;
use pricewatch::models::{
    Alert, BandDirection, Condition, CrossDirection, CrossSide, LevelDirection, Series, Target,
};

use crate::support::price_alert;

/// Append `price` to the history and run one evaluation step.
fn step(alert: &mut Alert, price: f64) -> bool {
    alert.series.history.push(price);
    let observation = evaluate(alert, price, Utc::now()).unwrap();
    apply_edge(alert, &observation)
}

#[test]
fn test_price_level_fires_once_per_episode() {
    let mut alert = price_alert("AAPL", LevelDirection::Above, 100.0);

    assert!(step(&mut alert, 105.0));
    assert!(alert.notified());
    assert!(alert.last_triggered());

    assert!(!step(&mut alert, 105.0));
    assert!(alert.notified());
    assert!(!alert.last_triggered());

    assert!(!step(&mut alert, 95.0));
    assert!(!alert.notified());

    assert!(step(&mut alert, 101.0));
}

#[test]
fn test_price_below_and_equal_threshold() {
    let mut alert = price_alert("AAPL", LevelDirection::Below, 100.0);
    assert!(!step(&mut alert, 100.0));
    assert!(step(&mut alert, 99.5));
}

#[test]
fn test_ma_cross_debounces_and_rearms() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::MaCross {
            short: 2,
            long: 4,
            direction: CrossDirection::CrossesAbove,
        },
    )
    .with_history(vec![1.0, 2.0, 3.0]);

    // Rising: short above long, unset state counts as a crossing.
    assert!(step(&mut alert, 4.0));
    assert_eq!(alert.last_cross(), Some(CrossSide::Above));
    assert!(!step(&mut alert, 5.0));

    // Falling below records the side without firing.
    assert!(!step(&mut alert, 1.0));
    assert!(!step(&mut alert, 0.5));
    assert_eq!(alert.last_cross(), Some(CrossSide::Below));

    // Back above fires again.
    assert!(!step(&mut alert, 3.0) && alert.last_cross() == Some(CrossSide::Below));
    assert!(step(&mut alert, 8.0));
    assert_eq!(alert.last_cross(), Some(CrossSide::Above));
}

#[test]
fn test_equal_sides_keep_cross_state() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::MaCross {
            short: 2,
            long: 4,
            direction: CrossDirection::CrossesBelow,
        },
    )
    .with_history(vec![2.0, 2.0, 2.0]);

    let observation = {
        alert.series.history.push(2.0);
        evaluate(&alert, 2.0, Utc::now()).unwrap()
    };
    assert!(matches!(observation, Observation::Cross { side: None, .. }));
    assert!(!apply_edge(&mut alert, &observation));
    assert_eq!(alert.last_cross(), None);
}

#[test]
fn test_bollinger_upper_touch() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::BollingerBand {
            window: 5,
            num_std_dev: 1.0,
            direction: BandDirection::CrossesAboveUpper,
        },
    )
    .with_history(vec![10.0, 10.0, 10.0, 10.0]);

    // Flat window: last close sits on the band, not above it.
    assert!(!step(&mut alert, 10.0));
    assert_eq!(alert.last_cross(), Some(CrossSide::Below));

    assert!(step(&mut alert, 20.0));
    let message = compose_message(&alert, 20.0, &evaluate(&alert, 20.0, Utc::now()).unwrap());
    assert!(message.contains("AAPL"));
    assert!(message.contains("upper Bollinger band"));
}

#[test]
fn test_insufficient_history_changes_nothing() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Rsi {
            period: 14,
            direction: LevelDirection::Above,
            threshold: 70.0,
        },
    );
    alert.series.history.push(100.0);
    let observation = evaluate(&alert, 100.0, Utc::now()).unwrap();
    assert_eq!(observation, Observation::Insufficient);
    assert!(!apply_edge(&mut alert, &observation));
    assert!(!alert.notified());
}

/// Append a bar whose high and low equal `price`.
fn step_bar(alert: &mut Alert, price: f64) -> bool {
    alert.series.highs.push(price);
    alert.series.lows.push(price);
    step(alert, price)
}

#[test]
fn test_undefined_indicator_after_warm_up_rearms_level() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Stochastic {
            k_period: 3,
            d_period: 1,
            direction: LevelDirection::Below,
            threshold: 20.0,
        },
    );

    let mut fires = 0;
    for price in [100.0, 101.0, 102.0, 90.0, 90.0, 90.0, 90.0, 90.0, 85.0] {
        if step_bar(&mut alert, price) {
            fires += 1;
        }
    }
    assert_eq!(fires, 2);
}

#[test]
fn test_flat_range_clears_notified_once_warmed_up() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Stochastic {
            k_period: 3,
            d_period: 1,
            direction: LevelDirection::Below,
            threshold: 20.0,
        },
    );
    for price in [100.0, 101.0, 102.0] {
        assert!(!step_bar(&mut alert, price));
    }
    assert!(step_bar(&mut alert, 90.0));
    assert!(alert.notified());

    assert!(!step_bar(&mut alert, 90.0));
    assert!(alert.notified());

    // Window is now [90, 90, 90]: %K is undefined.
    assert!(!step_bar(&mut alert, 90.0));
    assert!(!alert.notified());
}

#[test]
fn test_undefined_cross_keeps_cross_state() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::MaCross {
            short: 2,
            long: 4,
            direction: CrossDirection::CrossesAbove,
        },
    )
    .with_history(vec![1.0, 2.0, 3.0]);
    assert!(step(&mut alert, 4.0));

    // An undefined observation leaves the crossing state alone.
    assert!(!apply_edge(&mut alert, &Observation::Insufficient));
    assert_eq!(alert.last_cross(), Some(CrossSide::Above));
    assert!(!step(&mut alert, 5.0));
}

#[test]
fn test_rsi_overbought_triggers() {
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Rsi {
            period: 3,
            direction: LevelDirection::Above,
            threshold: 70.0,
        },
    )
    .with_history(vec![10.0, 11.0, 12.0]);

    assert!(step(&mut alert, 13.0));
    let message = compose_message(&alert, 13.0, &evaluate(&alert, 13.0, Utc::now()).unwrap());
    assert!(message.contains("RSI(3)"));
    assert!(message.contains("13"));
}

#[test]
fn test_manual_fires_once_when_due() {
    let past = (Utc::now() - Duration::minutes(1)).timestamp_millis();
    let mut alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Manual {
            trigger_timestamp: past,
            note: Some("earnings".to_string()),
        },
    );

    assert!(step(&mut alert, 150.0));
    assert!(!step(&mut alert, 150.0));

    let future = (Utc::now() + Duration::hours(1)).timestamp_millis();
    let mut pending = Alert::new(
        Target::stock("AAPL"),
        Condition::Manual {
            trigger_timestamp: future,
            note: None,
        },
    );
    assert!(!step(&mut pending, 150.0));
}

#[test]
fn test_range_indicators_reject_mismatched_buffers() {
    let alert = Alert::new(
        Target::stock("AAPL"),
        Condition::Adx {
            period: 3,
            direction: LevelDirection::Above,
            threshold: 25.0,
        },
    )
    .with_series(Series {
        history: vec![1.0, 2.0, 3.0],
        highs: vec![1.0],
        lows: vec![1.0, 2.0, 3.0],
        ..Series::default()
    });

    assert_eq!(
        evaluate(&alert, 3.0, Utc::now()).unwrap_err(),
        IndicatorError::MismatchedSeries {
            closes: 3,
            highs: 1,
            lows: 3
        }
    );
}

#[test]
fn test_price_message_names_symbol_and_price() {
    let alert = price_alert("AAPL", LevelDirection::Above, 100.0);
    let observation = evaluate(&alert, 105.0, Utc::now()).unwrap();
    assert_eq!(
        compose_message(&alert, 105.0, &observation),
        "AAPL price is 105 (above 100)"
    );
}

#[test]
fn test_non_finite_price_is_an_error() {
    let alert = price_alert("AAPL", LevelDirection::Above, 100.0);
    assert!(evaluate(&alert, f64::NAN, Utc::now()).is_err());
}
