//! YAML seed documents for populating a graph
//!
//! ```yaml
//! users:
//!   - { first_name: alice, last_name: smith, email: alice@example.com }
//!   - { first_name: bobby, last_name: jones, email: bob@example.com }
//! requests:
//!   - { from: alice@example.com, to: bob@example.com }
//! ```
//!
//! Requests refer to users by email and go through the engine, so a pair
//! listed in both directions ends up as a friendship.

use crate::graph::{SocialError, SocialGraph, User};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read seed {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid seed document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown user in seed: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Social(#[from] SocialError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<SeedUser>,
    pub requests: Vec<SeedRequest>,
}

/// What [`Seed::apply`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_added: usize,
    /// Users skipped because their email was already taken
    pub users_skipped: usize,
    pub requests_sent: usize,
    /// Requests refused as duplicates
    pub requests_skipped: usize,
}

impl Seed {
    pub fn from_yaml(raw: &str) -> Result<Self, SeedError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// Add every user, then send every request
    ///
    /// Duplicate emails and duplicate requests are skipped with a warning.
    /// Anything else (invalid names, unknown emails) aborts.
    pub fn apply(&self, graph: &SocialGraph) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        for u in &self.users {
            let user = User::new(&u.first_name, &u.last_name, &u.email);
            match graph.add_user(user)? {
                Some(_) => report.users_added += 1,
                None => {
                    warn!(email = %u.email, "seed user already exists, skipping");
                    report.users_skipped += 1;
                }
            }
        }

        for r in &self.requests {
            let from = graph
                .find_user_by_email(&r.from)?
                .ok_or_else(|| SeedError::UnknownUser(r.from.clone()))?;
            let to = graph
                .find_user_by_email(&r.to)?
                .ok_or_else(|| SeedError::UnknownUser(r.to.clone()))?;

            match graph.send_friend_request(&from.id, &to.id) {
                Ok(_) => report.requests_sent += 1,
                Err(SocialError::DuplicateRelationship(reason)) => {
                    warn!(from = %r.from, to = %r.to, %reason, "seed request skipped");
                    report.requests_skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            users = report.users_added,
            requests = report.requests_sent,
            "seed applied"
        );
        Ok(report)
    }
}
