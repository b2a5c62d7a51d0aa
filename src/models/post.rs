//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - Input types for creating and updating posts
//! - Filter and pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum post content length in characters
pub const MIN_CONTENT_LENGTH: usize = 50;

/// Maximum post content length in characters
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Minimum post title length in characters
pub const MIN_TITLE_LENGTH: usize = 5;

/// Maximum post title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug, unique across all posts
    pub slug: String,
    /// Post title
    pub title: String,
    /// Post body (sanitized before persistence)
    pub content: String,
    /// Author user ID
    pub author_id: i64,
    /// Category ID; survives category deletion as None
    pub category_id: Option<i64>,
    /// Publication status
    pub status: PostStatus,
    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, refreshed on every mutation
    pub updated_at: DateTime<Utc>,
    /// View counter, monotonic
    #[serde(default)]
    pub views: i64,
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - visible to the author and staff only
    #[default]
    Draft,
    /// Published - visible to everyone
    Published,
    /// Archived - hidden from public listings but not deleted
    Archived,
}

impl PostStatus {
    /// Convert status to its database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    /// Parse status from its database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
///
/// The slug is not part of the input; it is derived from the title by the
/// service layer.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Author user ID
    pub author_id: i64,
    /// Category ID (optional)
    pub category_id: Option<i64>,
    /// Publication status (defaults to Draft)
    pub status: Option<PostStatus>,
}

/// Input for updating an existing post
///
/// `category_id` uses a double Option: the outer level distinguishes "leave
/// unchanged" from "set", the inner level allows clearing the category.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    /// New title (optional; changing it regenerates the slug)
    pub title: Option<String>,
    /// New body (optional)
    pub content: Option<String>,
    /// New category reference (optional; Some(None) clears it)
    pub category_id: Option<Option<i64>>,
    /// New status (optional)
    pub status: Option<PostStatus>,
}

/// Optional filters applied conjunctively to post listings
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match against title OR content
    pub search: Option<String>,
    /// Exact category slug
    pub category: Option<String>,
    /// Exact tag slug (membership test over the post's tag set)
    pub tag: Option<String>,
    /// Exact status
    pub status: Option<PostStatus>,
    /// Exact author username
    pub author: Option<String>,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Archived] {
            assert_eq!(PostStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 25, &params);
        assert_eq!(result.total_pages(), 3);
    }

}
