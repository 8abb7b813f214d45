//! Live update broadcaster.
//!
//! The scheduler publishes one serialized `alertUpdate` per pass; every
//! connected WebSocket client holds a receiver. Slow clients lag and skip
//! messages rather than holding the publisher back.

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::models::AlertUpdate;

const CHANNEL_CAPACITY: usize = 64;

pub struct AlertBroadcaster {
    sender: broadcast::Sender<String>,
    latest: RwLock<Option<String>>,
}

impl Default for AlertBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            latest: RwLock::new(None),
        }
    }

    /// Serialize and push an update to every subscriber. Returns the number
    /// of clients that received it.
    pub async fn publish(&self, update: &AlertUpdate) -> usize {
        let payload = match serde_json::to_string(update) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize alert update");
                return 0;
            }
        };

        *self.latest.write().await = Some(payload.clone());

        // Err only means nobody is listening.
        match self.sender.send(payload) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("Alert update published with no live clients");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Most recent published payload, replayed to newly connected clients.
    pub async fn latest(&self) -> Option<String> {
        self.latest.read().await.clone()
    }

    pub fn client_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
