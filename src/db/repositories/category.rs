//! Category repository
//!
//! Database operations for categories. Categories are a flat list; posts
//! reference them with an optional foreign key that nulls out on delete.

use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category with an already-unique slug
    async fn create(&self, name: &str, slug: &str) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// List the first `limit` categories ordered by name
    async fn list_first(&self, limit: i64) -> Result<Vec<Category>>;

    /// Rename a category; `slug` replaces the stored slug when present
    async fn update(&self, id: i64, name: &str, slug: Option<&str>) -> Result<Category>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a name is already taken by a different category
    async fn exists_by_name_excluding(&self, name: &str, exclude_id: i64) -> Result<bool>;

    /// Check if a name is already taken
    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str, slug: &str) -> Result<Category> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (name, slug, created_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(slug)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, slug, created_at FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        Ok(row.map(|row| row_to_category(&row)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, slug, created_at FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by slug")?;

        Ok(row.map(|row| row_to_category(&row)))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, slug, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn list_first(&self, limit: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, slug, created_at FROM categories ORDER BY name LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn update(&self, id: i64, name: &str, slug: Option<&str>) -> Result<Category> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found"))?;

        let new_slug = slug.unwrap_or(&existing.slug);

        sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
            .bind(name)
            .bind(new_slug)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;

        Ok(Category {
            id,
            name: name.to_string(),
            slug: new_slug.to_string(),
            created_at: existing.created_at,
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    async fn exists_by_name_excluding(&self, name: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM categories WHERE name = ? AND id != ?",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check category name")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category name")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category slug")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
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

    #[tokio::test]
    async fn test_create_list_ordering() {
        let pool = setup().await;
        let repo = SqlxCategoryRepository::new(pool);

        repo.create("Zig", "zig").await.unwrap();
        repo.create("Ada", "ada").await.unwrap();
        repo.create("Rust", "rust").await.unwrap();

        let all = repo.list().await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Rust", "Zig"]);

        let first_two = repo.list_first(2).await.unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(first_two[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_update_keeps_slug_when_absent() {
        let pool = setup().await;
        let repo = SqlxCategoryRepository::new(pool);

        let cat = repo.create("News", "news").await.unwrap();
        let renamed = repo.update(cat.id, "Updates", None).await.unwrap();
        assert_eq!(renamed.name, "Updates");
        assert_eq!(renamed.slug, "news");

        let renamed = repo.update(cat.id, "Updates", Some("updates")).await.unwrap();
        assert_eq!(renamed.slug, "updates");
    }

    #[tokio::test]
    async fn test_name_uniqueness_checks() {
        let pool = setup().await;
        let repo = SqlxCategoryRepository::new(pool);

        let cat = repo.create("News", "news").await.unwrap();
        assert!(repo.exists_by_name("News").await.unwrap());
        assert!(!repo.exists_by_name("Sports").await.unwrap());
        assert!(!repo.exists_by_name_excluding("News", cat.id).await.unwrap());
    }
}
