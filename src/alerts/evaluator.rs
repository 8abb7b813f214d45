//! Condition evaluation and edge detection.
//!
//! [`evaluate`] turns an alert's buffers (already holding the newest
//! observation) into an [`Observation`]; [`apply_edge`] folds that into the
//! alert's edge-state and reports whether this is a rising edge.
//!
//! Level conditions use `notified`: fire when the condition becomes true,
//! re-arm on the first observation where it is false or, once the indicator
//! has produced a value, undefined. Crossing conditions use
//! `lastCross`: fire when the observed side equals the wanted side and the
//! previously observed side did not. Manual alerts fire once.

use chrono::{DateTime, Utc};

use crate::indicators::momentum::{calculate_macd, calculate_rsi, calculate_stochastic};
use crate::indicators::statistics::{calculate_correlation, calculate_sharpe_from_prices};
use crate::indicators::trend::{calculate_adx, calculate_ma_cross};
use crate::indicators::volatility::{calculate_atr, calculate_bollinger_bands};
use crate::indicators::volume::{detect_volume_spike, volume_ratio};
use crate::indicators::IndicatorError;
use crate::models::{Alert, BandDirection, Condition, CrossSide, Series};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// Threshold comparison against `value`.
    Level { met: bool, value: f64 },
    /// `side` is `None` when both sides of the comparison are equal.
    /// `reference` is the level being crossed (long MA, signal line, band).
    Cross {
        side: Option<CrossSide>,
        wanted: CrossSide,
        reference: f64,
    },
    Manual { due: bool },
    /// Not enough history yet.
    Insufficient,
}

fn check_ranges(series: &Series) -> Result<(), IndicatorError> {
    let closes = series.history.len();
    if series.highs.len() != closes || series.lows.len() != closes {
        return Err(IndicatorError::MismatchedSeries {
            closes,
            highs: series.highs.len(),
            lows: series.lows.len(),
        });
    }
    Ok(())
}

fn level(value: Option<f64>, met: impl FnOnce(f64) -> bool) -> Observation {
    match value {
        Some(value) => Observation::Level {
            met: met(value),
            value,
        },
        None => Observation::Insufficient,
    }
}

fn side_of(a: f64, b: f64) -> Option<CrossSide> {
    if a > b {
        Some(CrossSide::Above)
    } else if a < b {
        Some(CrossSide::Below)
    } else {
        None
    }
}

/// Evaluate the alert's condition against the latest `price`.
pub fn evaluate(alert: &Alert, price: f64, now: DateTime<Utc>) -> Result<Observation, IndicatorError> {
    if !price.is_finite() {
        return Err(IndicatorError::NonFinite("price"));
    }
    let series = &alert.series;
    let closes = &series.history;

    let observation = match &alert.condition {
        Condition::Price {
            direction,
            threshold,
        } => Observation::Level {
            met: direction.is_met(price, *threshold),
            value: price,
        },
        Condition::Rsi {
            period,
            direction,
            threshold,
        } => level(calculate_rsi(closes, *period).map(|r| r.value), |v| {
            direction.is_met(v, *threshold)
        }),
        Condition::VolumeSpike { window, threshold } => {
            if detect_volume_spike(&series.volumes, *window, *threshold) {
                Observation::Level {
                    met: true,
                    value: volume_ratio(&series.volumes, *window).unwrap_or(f64::INFINITY),
                }
            } else {
                level(volume_ratio(&series.volumes, *window), |_| false)
            }
        }
        Condition::Adx {
            period,
            direction,
            threshold,
        } => {
            check_ranges(series)?;
            level(
                calculate_adx(&series.highs, &series.lows, closes, *period).map(|a| a.adx),
                |v| direction.is_met(v, *threshold),
            )
        }
        Condition::Stochastic {
            k_period,
            d_period,
            direction,
            threshold,
        } => {
            check_ranges(series)?;
            level(
                calculate_stochastic(closes, &series.highs, &series.lows, *k_period, *d_period)
                    .map(|s| s.k),
                |v| direction.is_met(v, *threshold),
            )
        }
        Condition::Atr {
            period,
            direction,
            threshold,
        } => {
            check_ranges(series)?;
            level(
                calculate_atr(&series.highs, &series.lows, closes, *period).map(|a| a.value),
                |v| direction.is_met(v, *threshold),
            )
        }
        Condition::Correlation {
            window,
            direction,
            threshold,
            ..
        } => level(
            calculate_correlation(closes, &series.history_b, *window),
            |v| direction.is_met(v, *threshold),
        ),
        Condition::Sharpe {
            risk_free_rate,
            window,
            direction,
            threshold,
        } => level(
            calculate_sharpe_from_prices(closes, *risk_free_rate, *window),
            |v| direction.is_met(v, *threshold),
        ),
        Condition::MaCross {
            short,
            long,
            direction,
        } => match calculate_ma_cross(closes, *short, *long) {
            Some(cross) => Observation::Cross {
                side: side_of(cross.short, cross.long),
                wanted: direction.side(),
                reference: cross.long,
            },
            None => Observation::Insufficient,
        },
        Condition::Macd {
            fast,
            slow,
            signal,
            direction,
        } => match calculate_macd(closes, *fast, *slow, *signal) {
            Some(macd) => Observation::Cross {
                side: side_of(macd.macd, macd.signal),
                wanted: direction.side(),
                reference: macd.signal,
            },
            None => Observation::Insufficient,
        },
        Condition::BollingerBand {
            window,
            num_std_dev,
            direction,
        } => match calculate_bollinger_bands(closes, *window, *num_std_dev) {
            Some(bands) => {
                let last = closes.last().copied().unwrap_or(price);
                match direction {
                    BandDirection::CrossesAboveUpper => Observation::Cross {
                        side: Some(if last > bands.upper {
                            CrossSide::Above
                        } else {
                            CrossSide::Below
                        }),
                        wanted: CrossSide::Above,
                        reference: bands.upper,
                    },
                    BandDirection::CrossesBelowLower => Observation::Cross {
                        side: Some(if last < bands.lower {
                            CrossSide::Below
                        } else {
                            CrossSide::Above
                        }),
                        wanted: CrossSide::Below,
                        reference: bands.lower,
                    },
                }
            }
            None => Observation::Insufficient,
        },
        Condition::Manual {
            trigger_timestamp, ..
        } => Observation::Manual {
            due: now.timestamp_millis() >= *trigger_timestamp,
        },
    };

    Ok(observation)
}

/// Fold an observation into the alert's edge-state. Returns true on a
/// rising edge.
pub fn apply_edge(alert: &mut Alert, observation: &Observation) -> bool {
    let triggered = match *observation {
        Observation::Level { met, .. } => {
            let rising = met && !alert.notified;
            alert.notified = met;
            alert.warmed_up = true;
            rising
        }
        Observation::Cross { side, wanted, .. } => match side {
            Some(side) => {
                let rising = side == wanted && alert.last_cross != Some(wanted);
                alert.last_cross = Some(side);
                rising
            }
            None => false,
        },
        Observation::Manual { due } => {
            let rising = due && !alert.notified;
            if due {
                alert.notified = true;
            }
            rising
        }
        Observation::Insufficient => {
            // A flat range or zero variance after warm-up means the
            // threshold is not met.
            if alert.warmed_up && alert.condition.is_level() {
                alert.notified = false;
            }
            false
        }
    };

    alert.last_triggered = triggered;
    triggered
}

fn cross_word(side: CrossSide) -> &'static str {
    match side {
        CrossSide::Above => "above",
        CrossSide::Below => "below",
    }
}

/// Human-readable trigger message. Always names the alert's label and the
/// observed price.
pub fn compose_message(alert: &Alert, price: f64, observation: &Observation) -> String {
    let label = alert.label();

    match (&alert.condition, observation) {
        (
            Condition::Price {
                direction,
                threshold,
            },
            _,
        ) => format!(
            "{} price is {} ({} {})",
            label,
            price,
            direction.as_str(),
            threshold
        ),
        (Condition::VolumeSpike { window, threshold }, Observation::Level { value, .. }) => {
            format!(
                "{} volume is {:.2}x its {}-period average (threshold {}x) at price {}",
                label, value, window, threshold, price
            )
        }
        (Condition::MaCross { short, long, .. }, Observation::Cross { wanted, .. }) => format!(
            "{} SMA({}) crossed {} SMA({}) at price {}",
            label,
            short,
            cross_word(*wanted),
            long,
            price
        ),
        (Condition::Macd { .. }, Observation::Cross { wanted, reference, .. }) => format!(
            "{} MACD crossed {} its signal line ({:.4}) at price {}",
            label,
            cross_word(*wanted),
            reference,
            price
        ),
        (
            Condition::BollingerBand { direction, .. },
            Observation::Cross { reference, .. },
        ) => {
            let band = match direction {
                BandDirection::CrossesAboveUpper => "above the upper",
                BandDirection::CrossesBelowLower => "below the lower",
            };
            format!(
                "{} price {} crossed {} Bollinger band ({:.2})",
                label, price, band, reference
            )
        }
        (Condition::Manual { note, .. }, _) => match note {
            Some(note) => format!("{} manual alert: {} (price {})", label, note, price),
            None => format!("{} manual alert triggered at price {}", label, price),
        },
        (condition, Observation::Level { value, .. }) => {
            let name = match condition {
                Condition::Rsi { period, .. } => format!("RSI({})", period),
                Condition::Adx { period, .. } => format!("ADX({})", period),
                Condition::Stochastic { k_period, .. } => format!("Stochastic %K({})", k_period),
                Condition::Atr { period, .. } => format!("ATR({})", period),
                Condition::Correlation { with, window, .. } => {
                    format!("correlation with {} ({})", with.label(), window)
                }
                Condition::Sharpe { .. } => "Sharpe ratio".to_string(),
                other => other.kind().as_str().to_string(),
            };
            format!(
                "{} {} is {:.2} ({} {}) at price {}",
                label,
                name,
                value,
                condition.direction().unwrap_or("at"),
                condition.threshold().unwrap_or_default(),
                price
            )
        }
        (condition, _) => format!(
            "{} {} alert triggered at price {}",
            label,
            condition.kind().as_str(),
            price
        ),
    }
}
