//! Collaborators the engine talks to: market data, notification channels,
//! the user directory and the live update broadcaster.

pub mod market_data;
pub mod notifications;
pub mod quotes;
pub mod users;
pub mod websocket;
