//! Query types and result structures

use crate::graph::{User, UserId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Adjacency snapshot: each user id mapped to the ids of its accepted friends
///
/// Rebuilt on every call and never stored. Keys iterate in id order, which is
/// also the root order community detection uses.
pub type Relations = BTreeMap<UserId, Vec<UserId>>;

/// Which side of a pending request a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Requests the user sent and that are still waiting
    #[default]
    Sent,
    /// Requests waiting for the user's answer
    Received,
}

/// One page of a user search
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    /// Users on this page
    pub users: Vec<User>,
    /// Number of matches before paging
    pub total_count: usize,
}
