//! Statistical measures: correlation, Sharpe ratio

pub mod correlation;
pub mod sharpe;

pub use correlation::*;
pub use sharpe::*;
