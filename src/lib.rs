//! Socialgraph: friendship state machine, graph queries and community detection
//!
//! An in-process engine for a small social network. Users send each other
//! friend requests; a request answered by a request in the opposite direction
//! becomes a friendship. Friend lists, pending requests and communities are
//! derived from the edge set on every query.
//!
//! # Core Concepts
//!
//! - **Users**: members identified by id, unique by email
//! - **Friendships**: edges between two users, pending until reciprocated
//! - **Communities**: connected components of the accepted-friendship graph
//! - **Change events**: every committed mutation is published to observers
//!
//! # Example
//!
//! ```
//! use socialgraph::{SocialGraph, User};
//!
//! let graph = SocialGraph::in_memory();
//! let alice = graph.add_user(User::new("alice", "smith", "alice@example.com")).unwrap().unwrap();
//! let bob = graph.add_user(User::new("bobby", "jones", "bob@example.com")).unwrap().unwrap();
//!
//! graph.send_friend_request(&alice.id, &bob.id).unwrap();
//! graph.send_friend_request(&bob.id, &alice.id).unwrap();
//! assert!(graph.is_friendship(&alice.id, &bob.id).unwrap());
//! assert_eq!(graph.count_communities().unwrap(), 1);
//! ```

pub mod config;
pub mod events;
mod graph;
pub mod query;
pub mod seed;
pub mod storage;
pub mod validate;

pub use config::{ConfigError, EngineConfig};
pub use events::{ChangeBus, ChangeEvent, Observer, ObserverError, SubscriptionId};
pub use graph::{
    Friendship, FriendshipKey, Message, MessageId, Notification, NotificationId, SocialError,
    SocialGraph, SocialResult, User, UserId,
};
pub use query::{CommunityDetector, Direction, Relations, UserPage, UserQuery};
pub use seed::{Seed, SeedError, SeedReport};
pub use storage::{Entity, EntityStore, MemoryStore, StorageError, StorageResult, Stores};
pub use validate::{ValidationError, ValidationLimits, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
