//! Indicator library: pure functions over oldest-first numeric series.
//!
//! Each calculation returns `None` (or `false` for the volume spike test) when
//! the input is too short for the requested window or when the result would
//! require dividing by zero.

pub mod error;

pub mod momentum;
pub mod statistics;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use error::IndicatorError;
