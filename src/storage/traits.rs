//! Storage trait definitions

use crate::graph::{
    Friendship, FriendshipKey, Message, MessageId, Notification, NotificationId, User, UserId,
};
use crate::validate::ValidationError;
use std::fmt::{Debug, Display};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Anything a store can hold
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Uniqueness rule beyond the id itself
    ///
    /// A store refuses to save an entity that conflicts with one it already holds.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id.clone()
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Entity for Friendship {
    type Id = FriendshipKey;

    fn id(&self) -> FriendshipKey {
        self.key()
    }
}

impl Entity for Message {
    type Id = MessageId;

    fn id(&self) -> MessageId {
        self.id.clone()
    }
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> NotificationId {
        self.id.clone()
    }
}

/// Key-value persistence for one entity type
///
/// Implementations must be thread-safe (Send + Sync). Absence is reported as
/// `Ok(None)`, never as an error.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Look up an entity by id
    fn find_one(&self, id: &E::Id) -> StorageResult<Option<E>>;

    /// Every stored entity
    fn find_all(&self) -> StorageResult<Vec<E>>;

    /// Insert a new entity
    ///
    /// Returns `None` if the id is taken or the entity conflicts with a stored one.
    fn save(&self, entity: E) -> StorageResult<Option<E>>;

    /// Replace an existing entity; `None` if nothing is stored under its id
    fn update(&self, entity: E) -> StorageResult<Option<E>>;

    /// Remove an entity; `None` if nothing is stored under the id
    fn delete(&self, id: &E::Id) -> StorageResult<Option<E>>;
}
