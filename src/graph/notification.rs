//! Notifications delivered to a single user

use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something a user should look at; deleting it marks it as read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Recipient
    pub user_id: UserId,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: UserId, description: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            description: description.into(),
            date: Utc::now(),
        }
    }

    pub(crate) fn friend_request(receiver: UserId, sender_email: &str) -> Self {
        Self::new(receiver, format!("Request from {}", sender_email))
    }

    pub(crate) fn message(receiver: UserId, sender_email: &str) -> Self {
        Self::new(receiver, format!("Message from {}", sender_email))
    }
}
