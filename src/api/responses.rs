//! Shared API response types
//!
//! Common response structures reused across endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{Category, ContactMessage, PagedResult, Post, Tag, User};

/// Full post response for detail and list endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagInfo>>,
}

/// Tag info embedded in post responses
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TagInfo {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            category_id: post.category_id,
            status: post.status.to_string(),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
            views: post.views,
            tags: None,
        }
    }
}

impl PostResponse {
    /// Attach tag info to the response
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(
            tags.into_iter()
                .map(|t| TagInfo {
                    id: t.id,
                    slug: t.slug,
                    name: t.name,
                })
                .collect(),
        );
        self
    }
}

/// Paginated post list response
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl From<PagedResult<Post>> for PostListResponse {
    fn from(result: PagedResult<Post>) -> Self {
        let total_pages = result.total_pages();
        Self {
            posts: result.items.into_iter().map(PostResponse::from).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// Category response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            slug: category.slug,
            name: category.name,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Public user representation; never exposes the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Contact message response (staff endpoints)
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactMessageResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(message: ContactMessage) -> Self {
        Self {
            id: message.id,
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            read: message.read,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}
