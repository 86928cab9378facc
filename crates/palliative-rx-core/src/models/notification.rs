//! In-app notifications.

use serde::{Deserialize, Serialize};

use crate::validation::{non_empty, validate_id, ValidationResult};

text_enum! {
    NotificationType ("notification type") {
        LowStock => "LOW_STOCK",
        ExpiryWarning => "EXPIRY_WARNING",
        OrderShipped => "ORDER_SHIPPED",
        OrderCompleted => "ORDER_COMPLETED",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
}

impl NewNotification {
    pub fn new(user_id: impl Into<String>, notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            notification_type,
            message: message.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("userId", &self.user_id)?;
        non_empty("message", &self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpdate {
    pub message: Option<String>,
    pub is_read: Option<bool>,
}

impl NotificationUpdate {
    pub fn apply(self, notification: &mut Notification) -> ValidationResult<()> {
        if let Some(message) = self.message {
            non_empty("message", &message)?;
            notification.message = message;
        }
        if let Some(is_read) = self.is_read {
            notification.is_read = is_read;
        }
        Ok(())
    }
}

/// Query filter for listing notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    pub user_id: Option<String>,
    #[serde(default)]
    pub unread: bool,
}
