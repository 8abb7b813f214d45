//! Fan-out of one trigger message across recipients and channels.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::Notifier;
use crate::models::{Channel, DeliveryRecord, User};

pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    max_concurrency: usize,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, max_concurrency: usize) -> Self {
        Self {
            notifier,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Every distinct channel across `users`, in user then channel order.
    pub fn channels_for(users: &[User]) -> Vec<Channel> {
        let mut seen = HashSet::new();
        users
            .iter()
            .flat_map(User::channels)
            .filter(|c| seen.insert((c.kind(), c.recipient().to_string())))
            .collect()
    }

    /// Attempt delivery on every channel, at most `max_concurrency` at a
    /// time. Records come back in the same order as [`Self::channels_for`].
    pub async fn dispatch(&self, users: &[User], subject: &str, message: &str) -> Vec<DeliveryRecord> {
        let channels = Self::channels_for(users);
        if channels.is_empty() {
            debug!("No notification channels configured");
            return Vec::new();
        }

        let notifier = &self.notifier;
        stream::iter(channels)
            .map(|channel| async move {
                let result = notifier.deliver(&channel, subject, message).await;
                let kind = channel.kind();
                let recipient = channel.recipient().to_string();
                match result {
                    Ok(()) => {
                        debug!(channel = kind.as_str(), "Notification delivered");
                        DeliveryRecord {
                            channel: kind,
                            recipient,
                            delivered: true,
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!(channel = kind.as_str(), error = %e, "Notification delivery failed");
                        DeliveryRecord {
                            channel: kind,
                            recipient,
                            delivered: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    /// Records for a dry run: every configured recipient, nothing sent.
    pub fn planned(users: &[User]) -> Vec<DeliveryRecord> {
        Self::channels_for(users)
            .into_iter()
            .map(|channel| DeliveryRecord {
                channel: channel.kind(),
                recipient: channel.recipient().to_string(),
                delivered: false,
                error: None,
            })
            .collect()
    }
}
