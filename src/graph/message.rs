//! Direct messages between two users

use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new random MessageId
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

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A message sent from one user to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: UserId,
    pub receiver: UserId,
    pub text: String,
    pub date: DateTime<Utc>,
    /// The message this one answers, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

impl Message {
    pub fn new(sender: UserId, receiver: UserId, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            text: text.into(),
            date: Utc::now(),
            reply_to: None,
        }
    }

    /// Mark this message as a reply
    pub fn in_reply_to(mut self, original: &MessageId) -> Self {
        self.reply_to = Some(original.clone());
        self
    }

    /// Override the timestamp
    pub fn at(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// True if the message was exchanged between `a` and `b`, in either direction
    pub fn between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender == a && &self.receiver == b) || (&self.sender == b && &self.receiver == a)
    }

    pub fn involves(&self, uid: &UserId) -> bool {
        &self.sender == uid || &self.receiver == uid
    }
}
