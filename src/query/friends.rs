//! Projections of the edge set: friends, pending requests, relations
//!
//! Everything here works on a slice of friendships already loaded from the
//! store and never mutates anything.

use super::types::{Direction, Relations};
use crate::graph::{Friendship, UserId};
use std::collections::HashSet;

/// Ids of everyone joined to `uid` by an accepted edge
///
/// Distinct, in edge order.
pub fn friend_ids<'a>(edges: &'a [Friendship], uid: &UserId) -> Vec<&'a UserId> {
    let mut seen: HashSet<&UserId> = HashSet::new();
    edges
        .iter()
        .filter(|f| f.is_accepted() && f.contains_user(uid))
        .map(|f| f.other_of(uid))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Ids on the other side of `uid`'s pending requests in the given direction
pub fn pending_ids<'a>(
    edges: &'a [Friendship],
    uid: &UserId,
    direction: Direction,
) -> Vec<&'a UserId> {
    edges
        .iter()
        .filter(|f| f.pending)
        .filter(|f| match direction {
            Direction::Sent => &f.sender == uid,
            Direction::Received => &f.receiver == uid,
        })
        .map(|f| f.other_of(uid))
        .collect()
}

/// Build the adjacency snapshot for `users`
///
/// Friends that are not in `users` are dropped, so stale edges pointing at
/// deleted users never show up.
pub fn build_relations<'a>(
    users: impl IntoIterator<Item = &'a UserId>,
    edges: &[Friendship],
) -> Relations {
    let users: Vec<&UserId> = users.into_iter().collect();
    let live: HashSet<&UserId> = users.iter().copied().collect();

    users
        .iter()
        .map(|uid| {
            let friends = friend_ids(edges, uid)
                .into_iter()
                .filter(|id| live.contains(*id))
                .cloned()
                .collect();
            ((*uid).clone(), friends)
        })
        .collect()
}
