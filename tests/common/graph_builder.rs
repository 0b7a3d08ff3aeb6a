//! Graph building utilities for scenario tests
//!
//! Users are referred to by short handles ("alice") which become both the
//! user id and the local part of the email.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use socialgraph::{EngineConfig, SocialGraph, User, UserId};

/// Builds a populated in-memory graph step by step
pub struct GraphBuilder {
    graph: SocialGraph,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            graph: SocialGraph::in_memory_with(config),
        }
    }

    /// Add users whose id is the handle itself
    pub fn users(self, handles: &[&str]) -> Self {
        for handle in handles {
            let user = User::new(*handle, "tester", email(handle)).with_id(*handle);
            self.graph
                .add_user(user)
                .expect("user store")
                .expect("handle already taken");
        }
        self
    }

    /// Pending request from `from` to `to`
    pub fn request(self, from: &str, to: &str) -> Self {
        self.graph
            .send_friend_request(&id(from), &id(to))
            .expect("request");
        self
    }

    /// Request in both directions
    pub fn friends(self, a: &str, b: &str) -> Self {
        self.request(a, b).request(b, a)
    }

    pub fn build(self) -> SocialGraph {
        self.graph
    }
}

pub fn id(handle: &str) -> UserId {
    UserId::from(handle)
}

pub fn email(handle: &str) -> String {
    format!("{}@example.com", handle)
}

/// Configuration for a random graph
#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    pub users: usize,
    /// Probability that a given pair becomes friends
    pub friend_probability: f64,
    /// Probability that a given non-friend pair has a pending request
    pub pending_probability: f64,
    pub seed: u64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            users: 40,
            friend_probability: 0.04,
            pending_probability: 0.05,
            seed: 7,
        }
    }
}

/// A reproducible random graph plus the accepted pairs it contains
pub fn random_graph(config: &RandomGraphConfig) -> (SocialGraph, Vec<(String, String)>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let handles: Vec<String> = (0..config.users).map(|i| format!("user{:03}", i)).collect();
    let refs: Vec<&str> = handles.iter().map(String::as_str).collect();
    let graph = GraphBuilder::new().users(&refs).build();

    let mut accepted = Vec::new();
    for (i, a) in handles.iter().enumerate() {
        for b in &handles[i + 1..] {
            let roll: f64 = rng.gen();
            if roll < config.friend_probability {
                graph.send_friend_request(&id(a), &id(b)).expect("request");
                graph.send_friend_request(&id(b), &id(a)).expect("accept");
                accepted.push((a.clone(), b.clone()));
            } else if roll < config.friend_probability + config.pending_probability {
                graph.send_friend_request(&id(a), &id(b)).expect("pending");
            }
        }
    }
    (graph, accepted)
}
