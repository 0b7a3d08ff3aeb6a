//! Query system for the social graph
//!
//! Derived, read-only views: friend lists, pending requests, the relations
//! snapshot, user search and community detection.

pub mod community;
pub mod friends;
mod find;
mod types;

pub use community::CommunityDetector;
pub use find::UserQuery;
pub use types::{Direction, Relations, UserPage};
