//! Momentum indicators: RSI, MACD, Stochastic

pub mod macd;
pub mod rsi;
pub mod stochastic;

pub use macd::*;
pub use rsi::*;
pub use stochastic::*;
