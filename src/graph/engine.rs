//! SocialGraph: the main entry point for the social network
//!
//! Owns no durable state. Users, friendships, messages and notifications live
//! in the injected [`Stores`]; the engine enforces the friendship state machine,
//! derives views from the edge set and publishes a [`ChangeEvent`] for every
//! committed change.

use super::friendship::{Friendship, FriendshipKey};
use super::message::{Message, MessageId};
use super::notification::{Notification, NotificationId};
use super::user::{User, UserId};
use crate::config::EngineConfig;
use crate::events::{ChangeBus, ChangeEvent, Observer, SubscriptionId};
use crate::query::{friends, CommunityDetector, Direction, Relations, UserPage, UserQuery};
use crate::storage::{StorageError, Stores};
use crate::validate::ValidationError;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur in social graph operations
#[derive(Debug, Error)]
pub enum SocialError {
    /// The pair already has a request or a friendship that forbids this one
    #[error("{0}")]
    DuplicateRelationship(String),

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    /// A write the engine depends on was refused after earlier writes succeeded
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),
}

impl From<StorageError> for SocialError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Validation(v) => SocialError::Validation(v),
            other => SocialError::Storage(other),
        }
    }
}

impl From<ValidationError> for SocialError {
    fn from(e: ValidationError) -> Self {
        SocialError::Validation(e)
    }
}

/// Result type for social graph operations
pub type SocialResult<T> = Result<T, SocialError>;

/// The social graph engine
///
/// Construct once and share by reference (or `Arc`). Mutations of one
/// unordered pair are serialised by a per-pair lock; nothing else is locked
/// by the engine.
pub struct SocialGraph {
    stores: Stores,
    bus: ChangeBus,
    config: EngineConfig,
    pair_locks: DashMap<FriendshipKey, Arc<Mutex<()>>>,
}

impl SocialGraph {
    /// Create an engine over the given stores
    pub fn new(stores: Stores, config: EngineConfig) -> Self {
        Self {
            bus: ChangeBus::new(config.source_name.clone()),
            stores,
            config,
            pair_locks: DashMap::new(),
        }
    }

    /// Validated in-memory stores and the default config
    pub fn in_memory() -> Self {
        Self::in_memory_with(EngineConfig::default())
    }

    /// Validated in-memory stores using the config's limits
    pub fn in_memory_with(config: EngineConfig) -> Self {
        let stores = Stores::in_memory(&config.limits);
        Self::new(stores, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    // === Observers ===

    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn publish(&self, event: ChangeEvent) {
        self.bus.publish(&event);
    }

    // === Users ===

    pub fn find_user(&self, id: &UserId) -> SocialResult<Option<User>> {
        Ok(self.stores.users.find_one(id)?)
    }

    pub fn find_user_by_email(&self, email: &str) -> SocialResult<Option<User>> {
        Ok(self
            .stores
            .users
            .find_all()?
            .into_iter()
            .find(|u| u.email == email))
    }

    pub fn all_users(&self) -> SocialResult<Vec<User>> {
        Ok(self.stores.users.find_all()?)
    }

    /// Search users by name/email with paging
    pub fn find_users(&self, query: &UserQuery) -> SocialResult<UserPage> {
        Ok(query.execute(self.all_users()?))
    }

    /// Add a user; `None` if the id or email is already taken
    pub fn add_user(&self, user: User) -> SocialResult<Option<User>> {
        let saved = self.stores.users.save(user)?;
        if let Some(user) = &saved {
            info!(user = %user.id, "user added");
            self.publish(ChangeEvent::UserAdded(user.clone()));
        }
        Ok(saved)
    }

    /// Replace a user's profile; `None` if the user does not exist
    pub fn update_user(&self, user: User) -> SocialResult<Option<User>> {
        let updated = self.stores.users.update(user)?;
        if let Some(user) = &updated {
            self.publish(ChangeEvent::UserUpdated(user.clone()));
        }
        Ok(updated)
    }

    /// Remove a user together with every friendship, notification and message
    /// that involves them
    ///
    /// The user record goes first, so nothing new can be validated against it
    /// while the cascade runs. The cascade runs even if the user itself is
    /// already gone, which clears edges left pointing at it. `UserRemoved` is
    /// published last.
    pub fn delete_user(&self, uid: &UserId) -> SocialResult<Option<User>> {
        let deleted = self.stores.users.delete(uid)?;

        for friendship in self.all_friendships()? {
            if !friendship.contains_user(uid) {
                continue;
            }
            self.with_pair_lock(&friendship.sender, &friendship.receiver, |events| {
                self.remove_edge(&friendship, events)
            })?;
        }
        for notification in self.notifications_of(uid)? {
            self.delete_notification(&notification.id)?;
        }
        for message in self.all_messages()? {
            if message.involves(uid) {
                self.delete_message(&message.id)?;
            }
        }

        if let Some(user) = &deleted {
            info!(user = %user.id, "user deleted");
            self.publish(ChangeEvent::UserRemoved(user.clone()));
        }
        Ok(deleted)
    }

    fn require_user(&self, id: &UserId) -> SocialResult<User> {
        self.find_user(id)?.ok_or_else(|| SocialError::EntityNotFound {
            kind: "user",
            id: id.to_string(),
        })
    }

    /// Re-check after a write that a concurrent `delete_user` may have raced
    fn require_endpoints(&self, a: &UserId, b: &UserId) -> SocialResult<()> {
        self.require_user(a)?;
        self.require_user(b)?;
        Ok(())
    }

    // === Graph queries ===

    pub fn all_friendships(&self) -> SocialResult<Vec<Friendship>> {
        Ok(self.stores.friendships.find_all()?)
    }

    /// The edge between `a` and `b`, whichever of them sent it
    pub fn find_friendship(&self, a: &UserId, b: &UserId) -> SocialResult<Option<Friendship>> {
        Ok(self.stores.friendships.find_one(&FriendshipKey::new(a, b))?)
    }

    /// True iff `a` and `b` are joined by an accepted edge
    pub fn is_friendship(&self, a: &UserId, b: &UserId) -> SocialResult<bool> {
        Ok(self
            .find_friendship(a, b)?
            .map(|f| f.is_accepted())
            .unwrap_or(false))
    }

    /// Users joined to `uid` by an accepted edge, without duplicates
    pub fn friends_of(&self, uid: &UserId) -> SocialResult<Vec<User>> {
        let edges = self.all_friendships()?;
        self.resolve_users(friends::friend_ids(&edges, uid))
    }

    /// Users `uid` has asked and who have not answered yet
    pub fn sent_requests_of(&self, uid: &UserId) -> SocialResult<Vec<User>> {
        let edges = self.all_friendships()?;
        self.resolve_users(friends::pending_ids(&edges, uid, Direction::Sent))
    }

    /// Users waiting for `uid` to answer their request
    pub fn received_requests_of(&self, uid: &UserId) -> SocialResult<Vec<User>> {
        let edges = self.all_friendships()?;
        self.resolve_users(friends::pending_ids(&edges, uid, Direction::Received))
    }

    /// Fresh adjacency snapshot over all users
    pub fn relations(&self) -> SocialResult<Relations> {
        let users = self.all_users()?;
        let edges = self.all_friendships()?;
        let relations = friends::build_relations(users.iter().map(|u| &u.id), &edges);
        debug!(users = relations.len(), edges = edges.len(), "relations rebuilt");
        Ok(relations)
    }

    /// Ids that no longer resolve are skipped
    fn resolve_users(&self, ids: Vec<&UserId>) -> SocialResult<Vec<User>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find_user(id)? {
                Some(user) => users.push(user),
                None => debug!(user = %id, "skipping edge to missing user"),
            }
        }
        Ok(users)
    }

    // === Communities ===

    pub fn communities_view(&self) -> CommunityDetector<'_> {
        CommunityDetector::new(self)
    }

    pub fn communities(&self) -> SocialResult<Vec<Vec<UserId>>> {
        self.communities_view().communities()
    }

    pub fn count_communities(&self) -> SocialResult<usize> {
        self.communities_view().count_communities()
    }

    /// Members of the largest community (first found on ties)
    pub fn most_social_community(&self) -> SocialResult<Vec<User>> {
        self.communities_view().largest_community()
    }

    // === Friendship state machine ===

    /// Run `f` holding the pair's lock, then publish what it collected
    ///
    /// Events go out after the lock is released, so observers may call back
    /// into the engine for the same pair. The table entry is dropped once no
    /// other caller holds or waits on it.
    fn with_pair_lock<T>(
        &self,
        a: &UserId,
        b: &UserId,
        f: impl FnOnce(&mut Vec<ChangeEvent>) -> SocialResult<T>,
    ) -> SocialResult<T> {
        let key = FriendshipKey::new(a, b);
        let lock = self
            .pair_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let mut events = Vec::new();
        let outcome = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut events)
        };
        drop(lock);
        self.pair_locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);

        for event in events {
            self.publish(event);
        }
        outcome
    }

    /// Ask `receiver` to be friends with `sender`
    ///
    /// - no edge: a pending edge `sender -> receiver` is created and the
    ///   receiver gets a "Request from <email>" notification
    /// - pending edge from `receiver`: mutual interest, the pair becomes friends
    /// - pending edge from `sender`, or already friends: `DuplicateRelationship`
    ///
    /// Returns the edge as it stands afterwards.
    pub fn send_friend_request(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> SocialResult<Friendship> {
        if sender == receiver {
            return Err(ValidationError::new("Sender and Receiver must not be the same").into());
        }
        let sender_user = self.require_user(sender)?;
        self.require_user(receiver)?;

        self.with_pair_lock(sender, receiver, |events| {
            match self.find_friendship(sender, receiver)? {
                Some(existing) if existing.is_accepted() => Err(
                    SocialError::DuplicateRelationship("Friendship already exists".to_string()),
                ),
                Some(existing) if &existing.sender == sender => Err(
                    SocialError::DuplicateRelationship("Request already sent".to_string()),
                ),
                Some(existing) => self.accept_reciprocal(existing, sender, receiver, events),
                None => self.create_request(&sender_user, receiver, events),
            }
        })
    }

    /// Replace the opposite pending edge by an accepted one
    fn accept_reciprocal(
        &self,
        pending: Friendship,
        sender: &UserId,
        receiver: &UserId,
        events: &mut Vec<ChangeEvent>,
    ) -> SocialResult<Friendship> {
        self.stores.friendships.delete(&pending.key())?;
        let accepted = match self.make_friendship(sender, receiver) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(pair = %pending.key(), error = %e, "accept failed, restoring request");
                if !matches!(self.stores.friendships.save(pending.clone()), Ok(Some(_))) {
                    events.push(ChangeEvent::FriendshipRemoved(pending));
                }
                return Err(e);
            }
        };
        if let Err(e) = self.require_endpoints(sender, receiver) {
            warn!(pair = %accepted.key(), "user deleted during accept, dropping edge");
            self.stores.friendships.delete(&accepted.key())?;
            events.push(ChangeEvent::FriendshipRemoved(pending));
            return Err(e);
        }

        info!(sender = %sender, receiver = %receiver, "request accepted");
        events.push(ChangeEvent::RequestAccepted(accepted.clone()));
        Ok(accepted)
    }

    /// Store an accepted edge without looking for an existing one
    ///
    /// Callers clear any previous edge for the pair first.
    pub(crate) fn make_friendship(&self, a: &UserId, b: &UserId) -> SocialResult<Friendship> {
        let friendship = Friendship::accepted(a.clone(), b.clone());
        self.stores
            .friendships
            .save(friendship)?
            .ok_or_else(|| {
                SocialError::InconsistentState(format!(
                    "friendship {} refused by store",
                    FriendshipKey::new(a, b)
                ))
            })
    }

    /// New pending edge plus its notification, or neither
    fn create_request(
        &self,
        sender: &User,
        receiver: &UserId,
        events: &mut Vec<ChangeEvent>,
    ) -> SocialResult<Friendship> {
        let request = Friendship::request(sender.id.clone(), receiver.clone());
        let Some(request) = self.stores.friendships.save(request)? else {
            return Err(SocialError::DuplicateRelationship(
                "Request already sent".to_string(),
            ));
        };

        let notification = match self.notify_request(&request, &sender.email) {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    pair = %request.key(),
                    error = %e,
                    "notification failed, rolling back request"
                );
                self.stores.friendships.delete(&request.key())?;
                return Err(e);
            }
        };

        info!(sender = %request.sender, receiver = %request.receiver, "request sent");
        events.push(ChangeEvent::RequestSent(request.clone()));
        events.push(ChangeEvent::NotificationAdded(notification));
        Ok(request)
    }

    fn notify_request(
        &self,
        request: &Friendship,
        sender_email: &str,
    ) -> SocialResult<Notification> {
        self.require_endpoints(&request.sender, &request.receiver)?;
        let notification = Notification::friend_request(request.receiver.clone(), sender_email);
        self.stores.notifications.save(notification)?.ok_or_else(|| {
            SocialError::InconsistentState("request notification refused by store".to_string())
        })
    }

    fn remove_edge(
        &self,
        friendship: &Friendship,
        events: &mut Vec<ChangeEvent>,
    ) -> SocialResult<Option<Friendship>> {
        let removed = self.stores.friendships.delete(&friendship.key())?;
        if let Some(edge) = &removed {
            info!(pair = %edge.key(), pending = edge.pending, "friendship removed");
            events.push(ChangeEvent::FriendshipRemoved(edge.clone()));
        }
        Ok(removed)
    }

    /// Remove whatever links the two users, pending or accepted, in either
    /// direction
    ///
    /// Serves as decline, unsend and unfriend at once. Deletes the pair's
    /// messages too when `purge_chat_on_delete` is set. Nothing to remove is
    /// not an error. Returns the removed edges.
    pub fn delete_friend_request(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> SocialResult<Vec<Friendship>> {
        self.with_pair_lock(sender, receiver, |events| {
            let mut removed = Vec::new();
            for friendship in self.all_friendships()? {
                if friendship.connects(sender, receiver) {
                    if let Some(edge) = self.remove_edge(&friendship, events)? {
                        removed.push(edge);
                    }
                }
            }
            if self.config.purge_chat_on_delete {
                self.purge_chat(sender, receiver, events)?;
            }
            Ok(removed)
        })
    }

    /// `receiver` turns down the pending request `sender` made
    pub fn decline_request(
        &self,
        receiver: &UserId,
        sender: &UserId,
    ) -> SocialResult<Option<Friendship>> {
        self.remove_pending(sender, receiver)
    }

    /// `sender` withdraws a request that is still pending
    pub fn unsend_request(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> SocialResult<Option<Friendship>> {
        self.remove_pending(sender, receiver)
    }

    fn remove_pending(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> SocialResult<Option<Friendship>> {
        self.with_pair_lock(sender, receiver, |events| {
            match self.find_friendship(sender, receiver)? {
                Some(f) if f.pending && &f.sender == sender => self.remove_edge(&f, events),
                _ => Ok(None),
            }
        })
    }

    /// End an accepted friendship; pending requests are left alone
    ///
    /// Deletes the pair's messages when `purge_chat_on_unfriend` is set.
    pub fn unfriend(&self, a: &UserId, b: &UserId) -> SocialResult<Option<Friendship>> {
        self.with_pair_lock(a, b, |events| {
            let removed = match self.find_friendship(a, b)? {
                Some(f) if f.is_accepted() => self.remove_edge(&f, events)?,
                _ => None,
            };
            if removed.is_some() && self.config.purge_chat_on_unfriend {
                self.purge_chat(a, b, events)?;
            }
            Ok(removed)
        })
    }

    fn purge_chat(
        &self,
        a: &UserId,
        b: &UserId,
        events: &mut Vec<ChangeEvent>,
    ) -> SocialResult<usize> {
        let mut purged = 0;
        for message in self.all_messages()? {
            if !message.between(a, b) {
                continue;
            }
            if let Some(removed) = self.stores.messages.delete(&message.id)? {
                events.push(ChangeEvent::MessageRemoved(removed));
                purged += 1;
            }
        }
        if purged > 0 {
            debug!(a = %a, b = %b, purged, "chat purged");
        }
        Ok(purged)
    }

    // === Messages ===

    pub fn find_message(&self, id: &MessageId) -> SocialResult<Option<Message>> {
        Ok(self.stores.messages.find_one(id)?)
    }

    pub fn all_messages(&self) -> SocialResult<Vec<Message>> {
        Ok(self.stores.messages.find_all()?)
    }

    /// Messages `sender` sent to `receiver`
    pub fn sent_messages(&self, sender: &UserId, receiver: &UserId) -> SocialResult<Vec<Message>> {
        Ok(self
            .all_messages()?
            .into_iter()
            .filter(|m| &m.sender == sender && &m.receiver == receiver)
            .collect())
    }

    /// Both directions of a conversation, oldest first
    pub fn chat(&self, a: &UserId, b: &UserId) -> SocialResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .all_messages()?
            .into_iter()
            .filter(|m| m.between(a, b))
            .collect();
        messages.sort_by_key(|m| m.date);
        Ok(messages)
    }

    /// Store a message and notify its receiver
    ///
    /// Fails with `EntityNotFound` before writing anything if the sender does
    /// not exist. `None` if the store refused the message.
    pub fn add_message(&self, message: Message) -> SocialResult<Option<Message>> {
        let sender = self.require_user(&message.sender)?;

        let Some(message) = self.stores.messages.save(message)? else {
            return Ok(None);
        };
        let notification = match self.notify_message(&message, &sender.email) {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    message = %message.id,
                    error = %e,
                    "notification failed, rolling back message"
                );
                self.stores.messages.delete(&message.id)?;
                return Err(e);
            }
        };

        debug!(message = %message.id, "message added");
        self.publish(ChangeEvent::MessageAdded(message.clone()));
        self.publish(ChangeEvent::NotificationAdded(notification));
        Ok(Some(message))
    }

    fn notify_message(&self, message: &Message, sender_email: &str) -> SocialResult<Notification> {
        self.require_endpoints(&message.sender, &message.receiver)?;
        let notification = Notification::message(message.receiver.clone(), sender_email);
        self.stores.notifications.save(notification)?.ok_or_else(|| {
            SocialError::InconsistentState("message notification refused by store".to_string())
        })
    }

    pub fn update_message(&self, message: Message) -> SocialResult<Option<Message>> {
        let updated = self.stores.messages.update(message)?;
        if let Some(message) = &updated {
            self.publish(ChangeEvent::MessageUpdated(message.clone()));
        }
        Ok(updated)
    }

    pub fn delete_message(&self, id: &MessageId) -> SocialResult<Option<Message>> {
        let deleted = self.stores.messages.delete(id)?;
        if let Some(message) = &deleted {
            self.publish(ChangeEvent::MessageRemoved(message.clone()));
        }
        Ok(deleted)
    }

    // === Notifications ===

    pub fn find_notification(&self, id: &NotificationId) -> SocialResult<Option<Notification>> {
        Ok(self.stores.notifications.find_one(id)?)
    }

    pub fn all_notifications(&self) -> SocialResult<Vec<Notification>> {
        Ok(self.stores.notifications.find_all()?)
    }

    /// Notifications addressed to `uid`
    pub fn notifications_of(&self, uid: &UserId) -> SocialResult<Vec<Notification>> {
        Ok(self
            .all_notifications()?
            .into_iter()
            .filter(|n| &n.user_id == uid)
            .collect())
    }

    pub fn add_notification(
        &self,
        notification: Notification,
    ) -> SocialResult<Option<Notification>> {
        let saved = self.stores.notifications.save(notification)?;
        if let Some(notification) = &saved {
            self.publish(ChangeEvent::NotificationAdded(notification.clone()));
        }
        Ok(saved)
    }

    pub fn update_notification(
        &self,
        notification: Notification,
    ) -> SocialResult<Option<Notification>> {
        let updated = self.stores.notifications.update(notification)?;
        if let Some(notification) = &updated {
            self.publish(ChangeEvent::NotificationUpdated(notification.clone()));
        }
        Ok(updated)
    }

    /// Delete (mark as read) a notification
    pub fn delete_notification(&self, id: &NotificationId) -> SocialResult<Option<Notification>> {
        let deleted = self.stores.notifications.delete(id)?;
        if let Some(notification) = &deleted {
            self.publish(ChangeEvent::NotificationRemoved(notification.clone()));
        }
        Ok(deleted)
    }
}

impl std::fmt::Debug for SocialGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialGraph")
            .field("bus", &self.bus)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
