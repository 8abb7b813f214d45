//! Bounded, append-only log of trigger events.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::models::AlertEvent;

pub struct AlertHistory {
    events: RwLock<VecDeque<AlertEvent>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl AlertHistory {
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Assign the next sequence id and append, evicting the oldest entry
    /// when full. Returns the stored event.
    pub async fn append(&self, mut event: AlertEvent) -> AlertEvent {
        event.id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut events = self.events.write().await;
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
        event
    }

    /// Up to `limit` most recent events, newest first.
    pub async fn list(&self, limit: usize) -> Vec<AlertEvent> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.events.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}
