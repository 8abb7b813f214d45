//! Shared data models spanning the engine layers.

pub mod alert;
pub mod event;
pub mod indicators;
pub mod status;
pub mod user;

pub use alert::{
    Alert, AlertId, AlertKind, BandDirection, Condition, CrossDirection, CrossSide,
    LevelDirection, MarketDataHints, NotifyTarget, Series, Target,
};
pub use event::{AlertEvent, DeliveryRecord};
pub use indicators::{
    AdxIndicator, AtrIndicator, BollingerBandsIndicator, MacdIndicator, MovingAverageCross,
    RsiIndicator, StochasticIndicator,
};
pub use status::{AlertStatus, AlertUpdate};
pub use user::{Channel, ChannelKind, User};
