//! Post repository
//!
//! Database operations for posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite
//! - `PostScope`, the visibility scope applied to every list query
//!
//! Listing composes a visibility scope with optional filters in a single
//! query. The tag relation is joined through `post_tags`, so results are
//! selected DISTINCT to keep multi-tag posts from producing duplicate rows.

use crate::models::{CreatePostInput, Post, PostFilter, PostStatus, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Visibility scope restricting which posts a query may return.
///
/// Produced by the visibility policy from the requester identity; see
/// `services::policy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Anonymous requesters: published posts only
    PublishedOnly,
    /// Authenticated non-staff: published posts plus their own
    PublishedOrAuthor(i64),
    /// Staff: everything
    All,
}

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post with an already-unique slug
    async fn create(&self, input: &CreatePostInput, slug: &str) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts within a visibility scope, applying optional filters,
    /// ordered by creation time descending
    async fn list(
        &self,
        scope: PostScope,
        filter: &PostFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>>;

    /// Count posts matching a scope and filter
    async fn count(&self, scope: PostScope, filter: &PostFilter) -> Result<i64>;

    /// List draft posts; `author_id` of None means all authors (staff view)
    async fn list_drafts(&self, author_id: Option<i64>, offset: i64, limit: i64)
        -> Result<Vec<Post>>;

    /// Count draft posts; `author_id` of None means all authors
    async fn count_drafts(&self, author_id: Option<i64>) -> Result<i64>;

    /// Update a post; `slug` replaces the stored slug when present
    async fn update(&self, id: i64, input: &UpdatePostInput, slug: Option<&str>) -> Result<Post>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Atomically increment the view counter without touching other fields
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Published posts ordered by view count descending
    async fn list_popular(&self, limit: i64) -> Result<Vec<Post>>;

    /// Published posts sharing a category, excluding one post
    async fn list_related(&self, category_id: i64, exclude_id: i64, limit: i64)
        -> Result<Vec<Post>>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists on a different post (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const POST_COLUMNS: &str =
    "p.id, p.title, p.slug, p.content, p.author_id, p.category_id, p.status, \
     p.created_at, p.updated_at, p.views";

/// Append scope and filter conditions to a query builder.
///
/// The WHERE clause is shared between the list and count queries so the two
/// can never drift apart.
fn push_conditions(builder: &mut QueryBuilder<'_, Sqlite>, scope: PostScope, filter: &PostFilter) {
    builder.push(" WHERE 1=1");

    match scope {
        PostScope::PublishedOnly => {
            builder.push(" AND p.status = 'published'");
        }
        PostScope::PublishedOrAuthor(user_id) => {
            builder.push(" AND (p.status = 'published' OR p.author_id = ");
            builder.push_bind(user_id);
            builder.push(")");
        }
        PostScope::All => {}
    }

    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        builder.push(" AND (LOWER(p.title) LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR LOWER(p.content) LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(ref category) = filter.category {
        builder.push(" AND c.slug = ");
        builder.push_bind(category.clone());
    }

    if let Some(ref tag) = filter.tag {
        builder.push(" AND t.slug = ");
        builder.push_bind(tag.clone());
    }

    if let Some(status) = filter.status {
        builder.push(" AND p.status = ");
        builder.push_bind(status.as_str());
    }

    if let Some(ref author) = filter.author {
        builder.push(" AND u.username = ");
        builder.push_bind(author.clone());
    }
}

const FILTER_JOINS: &str = " FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN post_tags pt ON pt.post_id = p.id \
     LEFT JOIN tags t ON t.id = pt.tag_id";

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput, slug: &str) -> Result<Post> {
        let now = Utc::now();
        let status = input.status.unwrap_or_default();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, slug, content, author_id, category_id, status, created_at, updated_at, views)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&input.title)
        .bind(slug)
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(Post {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            slug: slug.to_string(),
            content: input.content.clone(),
            author_id: input.author_id,
            category_id: input.category_id,
            status,
            created_at: now,
            updated_at: now,
            views: 0,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, title, slug, content, author_id, category_id, status, created_at, updated_at, views \
             FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        row.map(|row| row_to_post(&row)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, title, slug, content, author_id, category_id, status, created_at, updated_at, views \
             FROM posts WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by slug")?;

        row.map(|row| row_to_post(&row)).transpose()
    }

    async fn list(
        &self,
        scope: PostScope,
        filter: &PostFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let mut builder = QueryBuilder::new(format!("SELECT DISTINCT {}", POST_COLUMNS));
        builder.push(FILTER_JOINS);
        push_conditions(&mut builder, scope, filter);
        builder.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count(&self, scope: PostScope, filter: &PostFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(DISTINCT p.id) as count");
        builder.push(FILTER_JOINS);
        push_conditions(&mut builder, scope, filter);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;

        Ok(row.get("count"))
    }

    async fn list_drafts(
        &self,
        author_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM posts p WHERE p.status = 'draft'",
            POST_COLUMNS
        ));
        if let Some(author_id) = author_id {
            builder.push(" AND p.author_id = ");
            builder.push_bind(author_id);
        }
        builder.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list drafts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count_drafts(&self, author_id: Option<i64>) -> Result<i64> {
        let mut builder =
            QueryBuilder::new("SELECT COUNT(*) as count FROM posts p WHERE p.status = 'draft'");
        if let Some(author_id) = author_id {
            builder.push(" AND p.author_id = ");
            builder.push_bind(author_id);
        }

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count drafts")?;

        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdatePostInput, slug: Option<&str>) -> Result<Post> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found"))?;

        let now = Utc::now();
        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_slug = slug.unwrap_or(&existing.slug);
        let new_content = input.content.as_ref().unwrap_or(&existing.content);
        let new_category_id = match input.category_id {
            Some(category_id) => category_id,
            None => existing.category_id,
        };
        let new_status = input.status.unwrap_or(existing.status);

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, slug = ?, content = ?, category_id = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_title)
        .bind(new_slug)
        .bind(new_content)
        .bind(new_category_id)
        .bind(new_status.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // post_tags entries are removed via ON DELETE CASCADE
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(())
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        // Partial write: views only, updated_at untouched
        sqlx::query("UPDATE posts SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment views")?;
        Ok(())
    }

    async fn list_popular(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT id, title, slug, content, author_id, category_id, status, created_at, updated_at, views \
             FROM posts WHERE status = 'published' \
             ORDER BY views DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list popular posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn list_related(
        &self,
        category_id: i64,
        exclude_id: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT id, title, slug, content, author_id, category_id, status, created_at, updated_at, views \
             FROM posts WHERE status = 'published' AND category_id = ? AND id != ? \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(category_id)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list related posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status_str: String = row.get("status");
    let status = PostStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status_str))?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        views: row.try_get("views").unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreatePostInput;

    async fn setup() -> SqlitePool {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, 'hash')",
        )
        .bind(username)
        .bind(format!("{}@example.com", username))
        .execute(pool)
        .await
        .expect("Failed to insert user");
        result.last_insert_rowid()
    }

    async fn insert_category(pool: &SqlitePool, name: &str, slug: &str) -> i64 {
        let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(pool)
            .await
            .expect("Failed to insert category");
        result.last_insert_rowid()
    }

    async fn insert_tag(pool: &SqlitePool, name: &str, slug: &str) -> i64 {
        let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(pool)
            .await
            .expect("Failed to insert tag");
        result.last_insert_rowid()
    }

    fn make_input(author_id: i64, title: &str, status: PostStatus) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: "c".repeat(60),
            author_id,
            category_id: None,
            status: Some(status),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;

        let post = repo
            .create(&make_input(author, "Hello", PostStatus::Published), "hello")
            .await
            .unwrap();
        assert!(post.id > 0);

        let found = repo.get_by_slug("hello").await.unwrap().unwrap();
        assert_eq!(found.id, post.id);
        assert_eq!(found.views, 0);
    }

    #[tokio::test]
    async fn test_scope_restricts_listing() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;

        repo.create(&make_input(alice, "Pub", PostStatus::Published), "pub")
            .await
            .unwrap();
        repo.create(&make_input(alice, "Mine", PostStatus::Draft), "mine")
            .await
            .unwrap();
        repo.create(&make_input(bob, "Theirs", PostStatus::Draft), "theirs")
            .await
            .unwrap();

        let filter = PostFilter::default();
        let anon = repo.list(PostScope::PublishedOnly, &filter, 0, 10).await.unwrap();
        assert_eq!(anon.len(), 1);

        let own = repo
            .list(PostScope::PublishedOrAuthor(alice), &filter, 0, 10)
            .await
            .unwrap();
        assert_eq!(own.len(), 2);

        let all = repo.list(PostScope::All, &filter, 0, 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_tag_filter_deduplicates() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;
        let t1 = insert_tag(&pool, "T1", "t1").await;
        let t2 = insert_tag(&pool, "T2", "t2").await;

        let post = repo
            .create(&make_input(author, "Tagged", PostStatus::Published), "tagged")
            .await
            .unwrap();
        for tag_id in [t1, t2] {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post.id)
                .bind(tag_id)
                .execute(&pool)
                .await
                .unwrap();
        }

        // Filtering by one of several tags must return the post exactly once
        let filter = PostFilter {
            tag: Some("t1".to_string()),
            ..Default::default()
        };
        let results = repo.list(PostScope::PublishedOnly, &filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(repo.count(PostScope::PublishedOnly, &filter).await.unwrap(), 1);

        // No tag filter with multiple tags joined must not duplicate either
        let results = repo
            .list(PostScope::PublishedOnly, &PostFilter::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_and_combined_filters() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;
        let cat = insert_category(&pool, "Rust", "rust").await;

        let mut input = make_input(author, "Learning Ferrous Things", PostStatus::Published);
        input.category_id = Some(cat);
        repo.create(&input, "learning").await.unwrap();
        repo.create(&make_input(author, "Other Topic", PostStatus::Published), "other")
            .await
            .unwrap();

        let filter = PostFilter {
            search: Some("FERROUS".to_string()),
            category: Some("rust".to_string()),
            author: Some("alice".to_string()),
            ..Default::default()
        };
        let results = repo.list(PostScope::PublishedOnly, &filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].slug, "learning");
    }

    #[tokio::test]
    async fn test_increment_views_leaves_updated_at() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;

        let post = repo
            .create(&make_input(author, "Hits", PostStatus::Published), "hits")
            .await
            .unwrap();

        for _ in 0..3 {
            repo.increment_views(post.id).await.unwrap();
        }

        let found = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found.views, 3);
        assert_eq!(found.updated_at, post.updated_at);
    }

    #[tokio::test]
    async fn test_drafts_listing_by_author() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;

        repo.create(&make_input(alice, "D1", PostStatus::Draft), "d1")
            .await
            .unwrap();
        repo.create(&make_input(bob, "D2", PostStatus::Draft), "d2")
            .await
            .unwrap();
        repo.create(&make_input(alice, "P", PostStatus::Published), "p")
            .await
            .unwrap();

        let own = repo.list_drafts(Some(alice), 0, 10).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].slug, "d1");

        let all = repo.list_drafts(None, 0, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.count_drafts(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_clears_category() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;
        let cat = insert_category(&pool, "News", "news").await;

        let mut input = make_input(author, "Categorized", PostStatus::Published);
        input.category_id = Some(cat);
        let post = repo.create(&input, "categorized").await.unwrap();

        let update = UpdatePostInput {
            category_id: Some(None),
            ..Default::default()
        };
        let updated = repo.update(post.id, &update, None).await.unwrap();
        assert_eq!(updated.category_id, None);
    }

    #[tokio::test]
    async fn test_popular_ordering() {
        let pool = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let author = insert_user(&pool, "alice").await;

        let a = repo
            .create(&make_input(author, "A", PostStatus::Published), "a")
            .await
            .unwrap();
        let b = repo
            .create(&make_input(author, "B", PostStatus::Published), "b")
            .await
            .unwrap();
        repo.create(&make_input(author, "Hidden", PostStatus::Draft), "hidden")
            .await
            .unwrap();

        for _ in 0..5 {
            repo.increment_views(b.id).await.unwrap();
        }
        repo.increment_views(a.id).await.unwrap();

        let popular = repo.list_popular(5).await.unwrap();
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].slug, "b");
        assert_eq!(popular[1].slug, "a");
    }
}
