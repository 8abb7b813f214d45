//! In-memory alert registry.
//!
//! Alerts are kept in insertion order so REST callers can address them by
//! index, and carry a stable id so the scheduler never confuses two alerts
//! when the list shifts underneath a pass.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::error::AlertError;
use crate::models::{Alert, AlertId, AlertStatus};

pub struct AlertRegistry {
    alerts: RwLock<Vec<Alert>>,
    next_id: AtomicU64,
}

impl Default for AlertRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Validate and append an alert, returning its id and index.
    ///
    /// Edge-state and runtime status always start cleared regardless of
    /// what the caller supplied.
    pub async fn add(&self, mut alert: Alert) -> Result<(AlertId, usize), AlertError> {
        alert.series.fill_ranges();
        alert.validate()?;

        alert.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        alert.last_cross = None;
        alert.notified = false;
        alert.warmed_up = false;
        alert.last_price = None;
        alert.last_triggered = false;
        alert.last_evaluated_at = None;
        alert.last_error = None;

        let mut alerts = self.alerts.write().await;
        alerts.push(alert);
        let index = alerts.len() - 1;
        Ok((alerts[index].id, index))
    }

    pub async fn all(&self) -> Vec<Alert> {
        self.alerts.read().await.clone()
    }

    pub async fn get_at(&self, index: usize) -> Result<Alert, AlertError> {
        self.alerts
            .read()
            .await
            .get(index)
            .cloned()
            .ok_or(AlertError::NotFound(index))
    }

    pub async fn remove_at(&self, index: usize) -> Result<Alert, AlertError> {
        let mut alerts = self.alerts.write().await;
        if index >= alerts.len() {
            return Err(AlertError::NotFound(index));
        }
        Ok(alerts.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.alerts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.alerts.read().await.is_empty()
    }

    pub async fn statuses(&self) -> Vec<AlertStatus> {
        self.alerts
            .read()
            .await
            .iter()
            .enumerate()
            .map(|(index, alert)| AlertStatus::from_alert(index, alert))
            .collect()
    }

    /// Mutate an alert in place. Returns `None` if it was removed.
    ///
    /// Crate-private: buffers and edge-state only change through the
    /// scheduler.
    pub(crate) async fn update<F, R>(&self, id: AlertId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Alert) -> R,
    {
        let mut alerts = self.alerts.write().await;
        alerts.iter_mut().find(|a| a.id == id).map(f)
    }
}
