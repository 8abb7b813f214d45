use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::alert::Alert;
use crate::models::user::ChannelKind;

/// Outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub channel: ChannelKind,
    pub recipient: String,
    pub delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A recorded trigger. `price` is `None` for test triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub alert: Alert,
    pub price: Option<f64>,
    pub message: String,
    pub notified_users: Vec<String>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryRecord>,
    #[serde(default)]
    pub test: bool,
}
