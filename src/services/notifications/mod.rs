//! Outbound notification channels.
//!
//! A [`Notifier`] delivers one message on one [`Channel`]. The
//! [`Dispatcher`] fans an event out across every channel of every resolved
//! recipient and records each attempt; one failing channel never stops the
//! others.

pub mod dispatcher;
pub mod http;

pub use dispatcher::Dispatcher;
pub use http::HttpNotifier;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::Channel;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, channel: &Channel, subject: &str, message: &str)
        -> Result<(), NotifyError>;
}
