//! Storage backends for the social graph
//!
//! The engine is storage-agnostic: it talks to one `EntityStore` per entity
//! type. `MemoryStore` is the in-process implementation.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{Entity, EntityStore, StorageError, StorageResult};

use crate::graph::{Friendship, Message, Notification, User};
use crate::validate::{
    FriendshipValidator, MessageValidator, NotificationValidator, UserValidator, ValidationLimits,
};
use std::sync::Arc;

/// The four stores the engine consumes
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn EntityStore<User>>,
    pub friendships: Arc<dyn EntityStore<Friendship>>,
    pub messages: Arc<dyn EntityStore<Message>>,
    pub notifications: Arc<dyn EntityStore<Notification>>,
}

impl Stores {
    /// In-memory stores, each guarded by its validator
    pub fn in_memory(limits: &ValidationLimits) -> Self {
        let users: Arc<dyn EntityStore<User>> =
            Arc::new(MemoryStore::<User>::with_validator(Arc::new(UserValidator)));
        let friendships = Arc::new(MemoryStore::<Friendship>::with_validator(Arc::new(
            FriendshipValidator::new(users.clone()),
        )));
        let messages = Arc::new(MemoryStore::<Message>::with_validator(Arc::new(
            MessageValidator::new(users.clone(), limits),
        )));
        let notifications = Arc::new(MemoryStore::<Notification>::with_validator(Arc::new(
            NotificationValidator::new(users.clone(), limits),
        )));

        Self {
            users,
            friendships,
            messages,
            notifications,
        }
    }

    /// In-memory stores with no validation at all
    pub fn unvalidated() -> Self {
        Self {
            users: Arc::new(MemoryStore::<User>::new()),
            friendships: Arc::new(MemoryStore::<Friendship>::new()),
            messages: Arc::new(MemoryStore::<Message>::new()),
            notifications: Arc::new(MemoryStore::<Notification>::new()),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
