//! Friendship edges and their unordered identity

use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a friendship: the unordered pair of its endpoints
///
/// `FriendshipKey::new(a, b) == FriendshipKey::new(b, a)`. Endpoints are stored
/// in ascending order so equality and hashing never depend on who asked first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FriendshipKey {
    low: UserId,
    high: UserId,
}

impl FriendshipKey {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        if a <= b {
            Self {
                low: a.clone(),
                high: b.clone(),
            }
        } else {
            Self {
                low: b.clone(),
                high: a.clone(),
            }
        }
    }

    /// Both endpoints, smallest id first
    pub fn endpoints(&self) -> (&UserId, &UserId) {
        (&self.low, &self.high)
    }

    pub fn contains(&self, uid: &UserId) -> bool {
        &self.low == uid || &self.high == uid
    }
}

impl std::fmt::Display for FriendshipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~{}", self.low, self.high)
    }
}

/// A relationship between two users
///
/// Pending while the receiver has not answered; accepted once both sides want it.
/// Sender and receiver are kept as directional metadata even though the
/// friendship is identified by its unordered [`FriendshipKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    /// Who asked
    pub sender: UserId,
    /// Who was asked
    pub receiver: UserId,
    /// When the request was made, or when it was accepted
    pub date: DateTime<Utc>,
    pub pending: bool,
}

impl Friendship {
    /// A fresh pending request from `sender` to `receiver`
    pub fn request(sender: UserId, receiver: UserId) -> Self {
        Self {
            sender,
            receiver,
            date: Utc::now(),
            pending: true,
        }
    }

    /// An already accepted friendship
    pub fn accepted(sender: UserId, receiver: UserId) -> Self {
        Self {
            pending: false,
            ..Self::request(sender, receiver)
        }
    }

    pub fn key(&self) -> FriendshipKey {
        FriendshipKey::new(&self.sender, &self.receiver)
    }

    pub fn contains_user(&self, uid: &UserId) -> bool {
        &self.sender == uid || &self.receiver == uid
    }

    /// True if this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender == a && &self.receiver == b) || (&self.sender == b && &self.receiver == a)
    }

    /// The endpoint that is not `uid`
    ///
    /// Mirrors the edge: asking for the other side of a user that is not on the
    /// edge yields the sender.
    pub fn other_of(&self, uid: &UserId) -> &UserId {
        if &self.sender == uid {
            &self.receiver
        } else {
            &self.sender
        }
    }

    pub fn is_accepted(&self) -> bool {
        !self.pending
    }
}
