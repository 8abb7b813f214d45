use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::alert::{Alert, AlertId, AlertKind, CrossSide};
use crate::models::event::AlertEvent;

/// Per-alert runtime view served by `/alerts/status` and pushed over `/ws`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatus {
    pub index: usize,
    pub alert_id: AlertId,
    pub symbol: String,
    pub kind: AlertKind,
    pub threshold: Option<f64>,
    pub direction: Option<String>,
    pub last_price: Option<f64>,
    pub last_triggered: bool,
    pub last_evaluated_at: Option<DateTime<Utc>>,
    pub notified: bool,
    pub last_cross: Option<CrossSide>,
    pub last_error: Option<String>,
}

impl AlertStatus {
    pub fn from_alert(index: usize, alert: &Alert) -> Self {
        Self {
            index,
            alert_id: alert.id,
            symbol: alert.label().to_string(),
            kind: alert.kind(),
            threshold: alert.condition.threshold(),
            direction: alert.condition.direction().map(str::to_string),
            last_price: alert.last_price(),
            last_triggered: alert.last_triggered(),
            last_evaluated_at: alert.last_evaluated_at(),
            notified: alert.notified(),
            last_cross: alert.last_cross(),
            last_error: alert.last_error().map(str::to_string),
        }
    }
}

/// Snapshot broadcast after every scheduler pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
    #[serde(rename = "type")]
    pub message_type: String,
    pub alert_status: Vec<AlertStatus>,
    pub alert_history: Vec<AlertEvent>,
    pub timestamp: DateTime<Utc>,
}

impl AlertUpdate {
    pub const MESSAGE_TYPE: &'static str = "alertUpdate";

    pub fn new(alert_status: Vec<AlertStatus>, alert_history: Vec<AlertEvent>) -> Self {
        Self {
            message_type: Self::MESSAGE_TYPE.to_string(),
            alert_status,
            alert_history,
            timestamp: Utc::now(),
        }
    }
}
