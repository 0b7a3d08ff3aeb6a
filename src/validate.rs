//! Entity validators
//!
//! Stores run a [`Validator`] before accepting a `save` or `update`, so an
//! invalid entity never reaches the engine's derived views.

use crate::graph::{Friendship, Message, Notification, User, UserId};
use crate::storage::EntityStore;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// 3 to 20 characters out of `[a-zA-Z0-9._-]`
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]{3,20}$").expect("name pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("email pattern compiles")
});

/// A structural or referential rule was violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Length limits applied by the message and notification validators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Messages must be strictly shorter than this many characters
    pub max_message_len: usize,
    /// Notification descriptions must be strictly shorter than this many characters
    pub max_notification_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_message_len: 1000,
            max_notification_len: 300,
        }
    }
}

/// Checks an entity before it is persisted
pub trait Validator<E>: Send + Sync {
    fn validate(&self, entity: &E) -> Result<(), ValidationError>;
}

pub fn check_name_format(name: &str) -> Result<(), ValidationError> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("Invalid name format"))
    }
}

pub fn check_email_format(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("Invalid email address format"))
    }
}

/// Name and email format
#[derive(Debug, Clone, Copy, Default)]
pub struct UserValidator;

impl Validator<User> for UserValidator {
    fn validate(&self, user: &User) -> Result<(), ValidationError> {
        check_name_format(&user.first_name)?;
        check_name_format(&user.last_name)?;
        check_email_format(&user.email)
    }
}

/// Both endpoints must exist and differ
fn check_endpoints(
    users: &dyn EntityStore<User>,
    sender: &UserId,
    receiver: &UserId,
) -> Result<(), ValidationError> {
    let exists = |id: &UserId| -> Result<bool, ValidationError> {
        users
            .find_one(id)
            .map(|u| u.is_some())
            .map_err(|e| ValidationError::new(format!("cannot resolve user {}: {}", id, e)))
    };
    if !exists(sender)? || !exists(receiver)? {
        return Err(ValidationError::new(
            "Sender or Receiver does not exist in the system",
        ));
    }
    if sender == receiver {
        return Err(ValidationError::new("Sender and Receiver must not be the same"));
    }
    Ok(())
}

/// Endpoints resolve in the user store and are distinct
pub struct FriendshipValidator {
    users: Arc<dyn EntityStore<User>>,
}

impl FriendshipValidator {
    pub fn new(users: Arc<dyn EntityStore<User>>) -> Self {
        Self { users }
    }
}

impl Validator<Friendship> for FriendshipValidator {
    fn validate(&self, friendship: &Friendship) -> Result<(), ValidationError> {
        check_endpoints(self.users.as_ref(), &friendship.sender, &friendship.receiver)
    }
}

/// Endpoints resolve, text is present and not too long
pub struct MessageValidator {
    users: Arc<dyn EntityStore<User>>,
    max_len: usize,
}

impl MessageValidator {
    pub fn new(users: Arc<dyn EntityStore<User>>, limits: &ValidationLimits) -> Self {
        Self {
            users,
            max_len: limits.max_message_len,
        }
    }
}

impl Validator<Message> for MessageValidator {
    fn validate(&self, message: &Message) -> Result<(), ValidationError> {
        check_endpoints(self.users.as_ref(), &message.sender, &message.receiver)?;
        if message.text.is_empty() {
            return Err(ValidationError::new("Message must not be empty"));
        }
        if message.text.chars().count() >= self.max_len {
            return Err(ValidationError::new(format!(
                "Message must be less than {} characters",
                self.max_len
            )));
        }
        Ok(())
    }
}

/// Recipient resolves, description is present and not too long
pub struct NotificationValidator {
    users: Arc<dyn EntityStore<User>>,
    max_len: usize,
}

impl NotificationValidator {
    pub fn new(users: Arc<dyn EntityStore<User>>, limits: &ValidationLimits) -> Self {
        Self {
            users,
            max_len: limits.max_notification_len,
        }
    }
}

impl Validator<Notification> for NotificationValidator {
    fn validate(&self, notification: &Notification) -> Result<(), ValidationError> {
        let found = self
            .users
            .find_one(&notification.user_id)
            .map_err(|e| ValidationError::new(format!("cannot resolve user: {}", e)))?;
        if found.is_none() {
            return Err(ValidationError::new("User does not exist in the system"));
        }
        if notification.description.is_empty() {
            return Err(ValidationError::new("Description must not be empty"));
        }
        if notification.description.chars().count() >= self.max_len {
            return Err(ValidationError::new(format!(
                "Description must be less than {} characters",
                self.max_len
            )));
        }
        Ok(())
    }
}
