use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::order::OrderStatus;
use super::user::UserId;

pub const ORDER_CREATED: &str = "order_created";
pub const ORDER_STATUS_CHANGED: &str = "order_status_changed";

/// Recipient type recorded on every notification addressed to an account.
pub const NOTIFIABLE_USER: &str = "user";

/// In-app notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub notifiable_type: String,
    pub notifiable_id: UserId,
    #[serde(rename = "donnees")]
    pub data: Value,
    #[serde(rename = "lu_le")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(rename = "cree_le")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    pub fn title(&self) -> &str {
        self.data.get("titre").and_then(Value::as_str).unwrap_or("Notification")
    }

    pub fn message(&self) -> &str {
        self.data.get("message").and_then(Value::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub kind: String,
    pub recipient: UserId,
    pub data: Value,
}

/// Payload stored with an `order_status_changed` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangePayload {
    pub titre: String,
    pub message: String,
    pub order_number: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}
