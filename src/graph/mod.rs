//! Core graph data structures and the engine that mutates them

mod engine;
mod friendship;
mod message;
mod notification;
mod user;


pub use engine::{SocialError, SocialGraph, SocialResult};
pub use friendship::{Friendship, FriendshipKey};
pub use message::{Message, MessageId};
pub use notification::{Notification, NotificationId};
pub use user::{User, UserId};
