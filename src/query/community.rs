//! Community detection: connected components of the accepted-friendship graph
//!
//! Pending requests never connect anyone. Roots are visited in the relations
//! map's key order, so when two communities tie for largest the first one
//! found wins.

use super::types::Relations;
use crate::graph::{SocialGraph, SocialResult, User, UserId};
use std::collections::HashSet;
use tracing::debug;

/// Connected components of `relations`, in discovery order
///
/// Iterative depth-first search. A neighbour is only expanded if it is unseen
/// *and* `is_friend(node, neighbour)` holds, so a caller can re-check live edge
/// state instead of trusting the snapshot. Nodes are marked seen before they
/// are pushed, which keeps symmetric edges from looping.
pub fn connected_components<E, F>(
    relations: &Relations,
    mut is_friend: F,
) -> Result<Vec<Vec<UserId>>, E>
where
    F: FnMut(&UserId, &UserId) -> Result<bool, E>,
{
    let mut seen: HashSet<&UserId> = HashSet::new();
    let mut components = Vec::new();

    for root in relations.keys() {
        if !seen.insert(root) {
            continue;
        }
        let mut members = vec![root.clone()];
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let Some(neighbours) = relations.get(node) else {
                continue;
            };
            for neighbour in neighbours {
                if seen.contains(neighbour) || !is_friend(node, neighbour)? {
                    continue;
                }
                seen.insert(neighbour);
                members.push(neighbour.clone());
                stack.push(neighbour);
            }
        }
        components.push(members);
    }

    Ok(components)
}

/// First component of maximal size
pub fn largest(components: Vec<Vec<UserId>>) -> Vec<UserId> {
    let mut best: Vec<UserId> = Vec::new();
    for component in components {
        if component.len() > best.len() {
            best = component;
        }
    }
    best
}

/// On-demand community queries over a [`SocialGraph`]
///
/// Holds no state of its own; every call takes a fresh relations snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CommunityDetector<'g> {
    graph: &'g SocialGraph,
}

impl<'g> CommunityDetector<'g> {
    pub fn new(graph: &'g SocialGraph) -> Self {
        Self { graph }
    }

    /// Every community as a list of member ids, in discovery order
    pub fn communities(&self) -> SocialResult<Vec<Vec<UserId>>> {
        let relations = self.graph.relations()?;
        let components =
            connected_components(&relations, |a, b| self.graph.is_friendship(a, b))?;
        debug!(
            users = relations.len(),
            communities = components.len(),
            "communities computed"
        );
        Ok(components)
    }

    /// Number of communities, isolated users included
    pub fn count_communities(&self) -> SocialResult<usize> {
        Ok(self.communities()?.len())
    }

    /// Members of the largest community
    ///
    /// Ids that no longer resolve to a user are skipped.
    pub fn largest_community(&self) -> SocialResult<Vec<User>> {
        let members = largest(self.communities()?);
        let mut users = Vec::with_capacity(members.len());
        for id in &members {
            if let Some(user) = self.graph.find_user(id)? {
                users.push(user);
            }
        }
        Ok(users)
    }
}
