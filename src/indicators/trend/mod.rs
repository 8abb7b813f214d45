//! Trend indicators: moving averages, ADX

pub mod adx;
pub mod moving_average;

pub use adx::*;
pub use moving_average::*;
