//! Alert definitions.
//!
//! An alert is a target (stock symbol or crypto pair), a condition (one
//! variant per kind, each carrying only its own parameters), rolling data
//! buffers, a notification target, and the edge-state the scheduler uses to
//! fire exactly once per trigger episode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AlertError;
use crate::models::user::User;

/// Stable identifier assigned by the registry at creation time.
pub type AlertId = u64;

/// What the alert watches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Stock { symbol: String },
    Crypto { id: String, vs: String },
}

impl Target {
    pub fn stock(symbol: impl Into<String>) -> Self {
        Target::Stock {
            symbol: symbol.into(),
        }
    }

    pub fn crypto(id: impl Into<String>, vs: impl Into<String>) -> Self {
        Target::Crypto {
            id: id.into(),
            vs: vs.into(),
        }
    }

    /// Display label: the stock symbol or the crypto asset id.
    pub fn label(&self) -> &str {
        match self {
            Target::Stock { symbol } => symbol,
            Target::Crypto { id, .. } => id,
        }
    }

    fn validate(&self) -> Result<(), AlertError> {
        match self {
            Target::Stock { symbol } if symbol.trim().is_empty() => {
                Err(AlertError::Invalid("symbol cannot be empty".to_string()))
            }
            Target::Crypto { id, vs } if id.trim().is_empty() || vs.trim().is_empty() => Err(
                AlertError::Invalid("crypto id and quote currency are required".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelDirection {
    Above,
    Below,
}

impl LevelDirection {
    pub fn is_met(self, value: f64, threshold: f64) -> bool {
        match self {
            LevelDirection::Above => value > threshold,
            LevelDirection::Below => value < threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LevelDirection::Above => "above",
            LevelDirection::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossDirection {
    CrossesAbove,
    CrossesBelow,
}

impl CrossDirection {
    pub fn side(self) -> CrossSide {
        match self {
            CrossDirection::CrossesAbove => CrossSide::Above,
            CrossDirection::CrossesBelow => CrossSide::Below,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrossDirection::CrossesAbove => "crosses_above",
            CrossDirection::CrossesBelow => "crosses_below",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandDirection {
    CrossesAboveUpper,
    CrossesBelowLower,
}

impl BandDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            BandDirection::CrossesAboveUpper => "crosses_above_upper",
            BandDirection::CrossesBelowLower => "crosses_below_lower",
        }
    }
}

/// Side of the comparison last observed by a crossing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossSide {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Price,
    MaCross,
    Rsi,
    Macd,
    BollingerBand,
    VolumeSpike,
    Adx,
    Stochastic,
    Atr,
    Correlation,
    Sharpe,
    Manual,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Price => "price",
            AlertKind::MaCross => "ma_cross",
            AlertKind::Rsi => "rsi",
            AlertKind::Macd => "macd",
            AlertKind::BollingerBand => "bollinger_band",
            AlertKind::VolumeSpike => "volume_spike",
            AlertKind::Adx => "adx",
            AlertKind::Stochastic => "stochastic",
            AlertKind::Atr => "atr",
            AlertKind::Correlation => "correlation",
            AlertKind::Sharpe => "sharpe",
            AlertKind::Manual => "manual",
        }
    }
}

fn default_period() -> usize {
    14
}
fn default_window() -> usize {
    20
}
fn default_fast() -> usize {
    12
}
fn default_slow() -> usize {
    26
}
fn default_signal() -> usize {
    9
}
fn default_num_std_dev() -> f64 {
    2.0
}
fn default_k_period() -> usize {
    14
}
fn default_d_period() -> usize {
    3
}
fn default_volume_multiplier() -> f64 {
    2.0
}

/// Trigger condition, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Condition {
    Price {
        direction: LevelDirection,
        threshold: f64,
    },
    MaCross {
        short: usize,
        long: usize,
        direction: CrossDirection,
    },
    Rsi {
        #[serde(default = "default_period")]
        period: usize,
        direction: LevelDirection,
        threshold: f64,
    },
    Macd {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default = "default_signal")]
        signal: usize,
        direction: CrossDirection,
    },
    BollingerBand {
        #[serde(default = "default_window")]
        window: usize,
        #[serde(default = "default_num_std_dev")]
        num_std_dev: f64,
        direction: BandDirection,
    },
    VolumeSpike {
        #[serde(default = "default_window")]
        window: usize,
        #[serde(default = "default_volume_multiplier")]
        threshold: f64,
    },
    Adx {
        #[serde(default = "default_period")]
        period: usize,
        direction: LevelDirection,
        threshold: f64,
    },
    Stochastic {
        #[serde(default = "default_k_period", alias = "smoothK")]
        k_period: usize,
        #[serde(default = "default_d_period", alias = "smoothD")]
        d_period: usize,
        direction: LevelDirection,
        threshold: f64,
    },
    Atr {
        #[serde(default = "default_period")]
        period: usize,
        direction: LevelDirection,
        threshold: f64,
    },
    Correlation {
        with: Target,
        #[serde(default = "default_window")]
        window: usize,
        direction: LevelDirection,
        threshold: f64,
    },
    Sharpe {
        #[serde(default)]
        risk_free_rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<usize>,
        direction: LevelDirection,
        threshold: f64,
    },
    Manual {
        /// Milliseconds since the Unix epoch.
        trigger_timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl Condition {
    pub fn kind(&self) -> AlertKind {
        match self {
            Condition::Price { .. } => AlertKind::Price,
            Condition::MaCross { .. } => AlertKind::MaCross,
            Condition::Rsi { .. } => AlertKind::Rsi,
            Condition::Macd { .. } => AlertKind::Macd,
            Condition::BollingerBand { .. } => AlertKind::BollingerBand,
            Condition::VolumeSpike { .. } => AlertKind::VolumeSpike,
            Condition::Adx { .. } => AlertKind::Adx,
            Condition::Stochastic { .. } => AlertKind::Stochastic,
            Condition::Atr { .. } => AlertKind::Atr,
            Condition::Correlation { .. } => AlertKind::Correlation,
            Condition::Sharpe { .. } => AlertKind::Sharpe,
            Condition::Manual { .. } => AlertKind::Manual,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        match self {
            Condition::Price { threshold, .. }
            | Condition::Rsi { threshold, .. }
            | Condition::VolumeSpike { threshold, .. }
            | Condition::Adx { threshold, .. }
            | Condition::Stochastic { threshold, .. }
            | Condition::Atr { threshold, .. }
            | Condition::Correlation { threshold, .. }
            | Condition::Sharpe { threshold, .. } => Some(*threshold),
            Condition::MaCross { .. }
            | Condition::Macd { .. }
            | Condition::BollingerBand { .. }
            | Condition::Manual { .. } => None,
        }
    }

    pub fn direction(&self) -> Option<&'static str> {
        match self {
            Condition::Price { direction, .. }
            | Condition::Rsi { direction, .. }
            | Condition::Adx { direction, .. }
            | Condition::Stochastic { direction, .. }
            | Condition::Atr { direction, .. }
            | Condition::Correlation { direction, .. }
            | Condition::Sharpe { direction, .. } => Some(direction.as_str()),
            Condition::MaCross { direction, .. } | Condition::Macd { direction, .. } => {
                Some(direction.as_str())
            }
            Condition::BollingerBand { direction, .. } => Some(direction.as_str()),
            Condition::VolumeSpike { .. } => Some("above"),
            Condition::Manual { .. } => None,
        }
    }

    /// Threshold conditions, debounced with `notified` rather than `lastCross`.
    pub fn is_level(&self) -> bool {
        self.threshold().is_some()
    }

    fn validate(&self) -> Result<(), AlertError> {
        fn positive(name: &str, value: usize) -> Result<(), AlertError> {
            if value == 0 {
                return Err(AlertError::Invalid(format!("{} must be greater than zero", name)));
            }
            Ok(())
        }

        if let Some(threshold) = self.threshold() {
            if !threshold.is_finite() {
                return Err(AlertError::Invalid("threshold must be a finite number".to_string()));
            }
        }

        match self {
            Condition::Price { .. } | Condition::Manual { .. } => Ok(()),
            Condition::MaCross { short, long, .. } => {
                positive("short", *short)?;
                positive("long", *long)?;
                if short >= long {
                    return Err(AlertError::Invalid("short must be less than long".to_string()));
                }
                Ok(())
            }
            Condition::Rsi { period, .. }
            | Condition::Adx { period, .. }
            | Condition::Atr { period, .. } => positive("period", *period),
            Condition::Macd {
                fast, slow, signal, ..
            } => {
                positive("fast", *fast)?;
                positive("slow", *slow)?;
                positive("signal", *signal)?;
                if fast >= slow {
                    return Err(AlertError::Invalid("fast must be less than slow".to_string()));
                }
                Ok(())
            }
            Condition::BollingerBand {
                window,
                num_std_dev,
                ..
            } => {
                positive("window", *window)?;
                if !num_std_dev.is_finite() || *num_std_dev < 0.0 {
                    return Err(AlertError::Invalid(
                        "numStdDev must be a non-negative number".to_string(),
                    ));
                }
                Ok(())
            }
            Condition::VolumeSpike { window, threshold } => {
                positive("window", *window)?;
                if *threshold <= 0.0 {
                    return Err(AlertError::Invalid(
                        "volume spike threshold must be positive".to_string(),
                    ));
                }
                Ok(())
            }
            Condition::Stochastic {
                k_period, d_period, ..
            } => {
                positive("kPeriod", *k_period)?;
                positive("dPeriod", *d_period)
            }
            Condition::Correlation { with, window, .. } => {
                with.validate()?;
                if *window < 2 {
                    return Err(AlertError::Invalid(
                        "correlation window must be at least 2".to_string(),
                    ));
                }
                Ok(())
            }
            Condition::Sharpe {
                risk_free_rate,
                window,
                ..
            } => {
                if !risk_free_rate.is_finite() {
                    return Err(AlertError::Invalid("riskFreeRate must be finite".to_string()));
                }
                if matches!(window, Some(w) if *w < 2) {
                    return Err(AlertError::Invalid(
                        "sharpe window must be at least 2".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Who gets notified when the alert fires.
///
/// On input, `{"allUsers": true}` selects broadcast; anything else is read as
/// a user record, so `allUsers: false` next to channel fields keeps them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotifyTarget {
    /// Resolved against the user directory at evaluation time.
    Broadcast {
        #[serde(rename = "allUsers")]
        all_users: bool,
    },
    User(User),
}

#[derive(Deserialize)]
struct RawNotifyTarget {
    #[serde(default, rename = "allUsers")]
    all_users: bool,
    #[serde(flatten)]
    user: User,
}

impl<'de> Deserialize<'de> for NotifyTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNotifyTarget::deserialize(deserializer)?;
        Ok(if raw.all_users {
            NotifyTarget::Broadcast { all_users: true }
        } else {
            NotifyTarget::User(raw.user)
        })
    }
}

impl Default for NotifyTarget {
    fn default() -> Self {
        NotifyTarget::User(User::default())
    }
}

/// Market-data source hints, opaque to evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketDataHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
}

impl MarketDataHints {
    pub fn is_empty(&self) -> bool {
        self.interval.is_none() && self.exchange.is_none()
    }
}

/// Rolling observation buffers, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default)]
    pub history: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lows: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<f64>,
    #[serde(default, rename = "historyB", skip_serializing_if = "Vec::is_empty")]
    pub history_b: Vec<f64>,
}

impl Series {
    /// Seed empty high/low buffers from the close history so range-based
    /// indicators line up with it.
    pub(crate) fn fill_ranges(&mut self) {
        if self.highs.is_empty() {
            self.highs = self.history.clone();
        }
        if self.lows.is_empty() {
            self.lows = self.history.clone();
        }
    }

    /// Append one observation to every buffer it feeds.
    pub(crate) fn push(&mut self, price: f64, high: Option<f64>, low: Option<f64>, volume: Option<f64>) {
        self.history.push(price);
        self.highs.push(high.unwrap_or(price).max(price));
        self.lows.push(low.unwrap_or(price).min(price));
        if let Some(volume) = volume {
            self.volumes.push(volume);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "alertId", default)]
    pub id: AlertId,
    #[serde(flatten)]
    pub target: Target,
    #[serde(flatten)]
    pub condition: Condition,
    #[serde(default)]
    pub notify: NotifyTarget,
    #[serde(default, rename = "tradingViewParams", skip_serializing_if = "MarketDataHints::is_empty")]
    pub hints: MarketDataHints,
    #[serde(flatten)]
    pub series: Series,

    // Edge-state and runtime status are owned by the scheduler.
    #[serde(skip_deserializing)]
    pub(crate) last_cross: Option<CrossSide>,
    #[serde(skip_deserializing)]
    pub(crate) notified: bool,
    /// Set once the condition has produced a value; from then on an
    /// undefined indicator counts as the condition not holding.
    #[serde(skip)]
    pub(crate) warmed_up: bool,
    #[serde(skip_deserializing)]
    pub(crate) last_price: Option<f64>,
    #[serde(skip_deserializing)]
    pub(crate) last_triggered: bool,
    #[serde(skip_deserializing)]
    pub(crate) last_evaluated_at: Option<DateTime<Utc>>,
    #[serde(skip_deserializing)]
    pub(crate) last_error: Option<String>,
}

impl Alert {
    pub fn new(target: Target, condition: Condition) -> Self {
        Self {
            id: 0,
            target,
            condition,
            notify: NotifyTarget::default(),
            hints: MarketDataHints::default(),
            series: Series::default(),
            last_cross: None,
            notified: false,
            warmed_up: false,
            last_price: None,
            last_triggered: false,
            last_evaluated_at: None,
            last_error: None,
        }
    }

    pub fn with_notify(mut self, notify: NotifyTarget) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series = series;
        self
    }

    pub fn with_history(mut self, history: Vec<f64>) -> Self {
        self.series.history = history;
        self
    }

    pub fn kind(&self) -> AlertKind {
        self.condition.kind()
    }

    pub fn label(&self) -> &str {
        self.target.label()
    }

    pub fn last_cross(&self) -> Option<CrossSide> {
        self.last_cross
    }

    pub fn notified(&self) -> bool {
        self.notified
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn last_triggered(&self) -> bool {
        self.last_triggered
    }

    pub fn last_evaluated_at(&self) -> Option<DateTime<Utc>> {
        self.last_evaluated_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Check parameters that the type system cannot express.
    pub fn validate(&self) -> Result<(), AlertError> {
        self.target.validate()?;
        self.condition.validate()?;
        let series = &self.series;
        let all_finite = [
            &series.history,
            &series.highs,
            &series.lows,
            &series.volumes,
            &series.history_b,
        ]
        .iter()
        .all(|buffer| buffer.iter().all(|v| v.is_finite()));
        if !all_finite {
            return Err(AlertError::Invalid("buffers must contain finite numbers".to_string()));
        }
        if series.highs.len() != series.history.len() || series.lows.len() != series.history.len()
        {
            return Err(AlertError::Invalid(
                "highs and lows must match the length of history".to_string(),
            ));
        }
        Ok(())
    }
}
