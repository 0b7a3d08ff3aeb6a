//! User search with paging

use super::types::UserPage;
use crate::graph::User;

/// Query for finding users by name or email
///
/// Filters are case-insensitive substring matches and are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Number of results to skip
    pub offset: Option<usize>,
}

impl UserQuery {
    /// Create a new empty query (matches all users)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, fragment: impl Into<String>) -> Self {
        self.first_name = Some(fragment.into());
        self
    }

    pub fn with_last_name(mut self, fragment: impl Into<String>) -> Self {
        self.last_name = Some(fragment.into());
        self
    }

    pub fn with_email(mut self, fragment: impl Into<String>) -> Self {
        self.email = Some(fragment.into());
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results (for pagination)
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Select the zero-based `page` of `page_size` users
    pub fn page(self, page: usize, page_size: usize) -> Self {
        self.offset(page.saturating_mul(page_size)).limit(page_size)
    }

    /// Execute the query against a list of users
    pub fn execute(&self, users: Vec<User>) -> UserPage {
        let matching: Vec<User> = users.into_iter().filter(|u| self.matches(u)).collect();
        let total_count = matching.len();

        let users = matching
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        UserPage { users, total_count }
    }

    /// Check if a user matches all query criteria
    fn matches(&self, user: &User) -> bool {
        contains_ci(&user.first_name, self.first_name.as_deref())
            && contains_ci(&user.last_name, self.last_name.as_deref())
            && contains_ci(&user.email, self.email.as_deref())
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
