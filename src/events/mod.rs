//! Change events fired after the engine commits a mutation
//!
//! One event per logical change: a cascade that removes N entities fires N
//! events.

mod bus;

pub use bus::{ChangeBus, ChannelObserver, Observer, ObserverError, PublishReport, SubscriptionId};

use crate::graph::{Friendship, Message, Notification, User};
use serde::Serialize;

/// What changed, with the entity as it was committed (or as it was before removal)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum ChangeEvent {
    UserAdded(User),
    UserUpdated(User),
    UserRemoved(User),
    /// A pending request was created
    RequestSent(Friendship),
    /// A reciprocal request turned a pending edge into a friendship
    RequestAccepted(Friendship),
    /// An edge was removed, pending or accepted
    FriendshipRemoved(Friendship),
    MessageAdded(Message),
    MessageUpdated(Message),
    MessageRemoved(Message),
    NotificationAdded(Notification),
    NotificationUpdated(Notification),
    NotificationRemoved(Notification),
}

impl ChangeEvent {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserAdded(_) => "user_added",
            Self::UserUpdated(_) => "user_updated",
            Self::UserRemoved(_) => "user_removed",
            Self::RequestSent(_) => "request_sent",
            Self::RequestAccepted(_) => "request_accepted",
            Self::FriendshipRemoved(_) => "friendship_removed",
            Self::MessageAdded(_) => "message_added",
            Self::MessageUpdated(_) => "message_updated",
            Self::MessageRemoved(_) => "message_removed",
            Self::NotificationAdded(_) => "notification_added",
            Self::NotificationUpdated(_) => "notification_updated",
            Self::NotificationRemoved(_) => "notification_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UserId;

    #[test]
    fn serializes_with_kind_tag() {
        let event = ChangeEvent::RequestSent(Friendship::request(
            UserId::from("a"),
            UserId::from("b"),
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "request_sent");
        assert_eq!(json["entity"]["sender"], "a");
        assert_eq!(event.kind(), "request_sent");
    }
}
