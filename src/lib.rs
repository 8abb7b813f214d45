//! Price and indicator alert engine.
//!
//! A polling scheduler evaluates user-defined alerts (price levels, moving
//! average crosses, RSI, MACD, Bollinger Bands, volume spikes, ADX,
//! stochastic, ATR, correlation, Sharpe ratio, manual triggers) against live
//! market data, fans out notifications once per trigger episode, records an
//! in-memory event history and pushes snapshots to live WebSocket clients.

pub mod alerts;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
