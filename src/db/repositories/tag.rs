//! Tag repository
//!
//! Database operations for tags and the post/tag relation.

use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag with an already-unique slug
    async fn create(&self, name: &str, slug: &str) -> Result<Tag>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// Get tag by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// List all tags ordered by name
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Tags attached to a post, ordered by name
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Tag>>;

    /// Replace a post's tag set
    async fn replace_for_post(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, name: &str, slug: &str) -> Result<Tag> {
        let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by slug")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by name")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.slug FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ? ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tags for post")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn replace_for_post(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag")?;
        }

        tx.commit().await.context("Failed to commit post tags")?;
        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check tag slug")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlitePool {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    async fn insert_post(pool: &SqlitePool) -> i64 {
        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('u', 'u@x', 'h')")
            .execute(pool)
            .await
            .unwrap();
        let result = sqlx::query(
            "INSERT INTO posts (title, slug, content, author_id, status) \
             VALUES ('Title', 't', 'c', 1, 'published')",
        )
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_replace_for_post() {
        let pool = setup().await;
        let repo = SqlxTagRepository::new(pool.clone());
        let post_id = insert_post(&pool).await;

        let a = repo.create("Alpha", "alpha").await.unwrap();
        let b = repo.create("Beta", "beta").await.unwrap();
        let c = repo.create("Gamma", "gamma").await.unwrap();

        repo.replace_for_post(post_id, &[a.id, b.id]).await.unwrap();
        let tags = repo.list_for_post(post_id).await.unwrap();
        assert_eq!(tags.len(), 2);

        repo.replace_for_post(post_id, &[c.id]).await.unwrap();
        let tags = repo.list_for_post(post_id).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].slug, "gamma");

        repo.replace_for_post(post_id, &[]).await.unwrap();
        assert!(repo.list_for_post(post_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_slug_and_name() {
        let pool = setup().await;
        let repo = SqlxTagRepository::new(pool);

        repo.create("Rust Lang", "rust-lang").await.unwrap();
        assert!(repo.get_by_slug("rust-lang").await.unwrap().is_some());
        assert!(repo.get_by_name("Rust Lang").await.unwrap().is_some());
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
        assert!(repo.exists_by_slug("rust-lang").await.unwrap());
    }
}
