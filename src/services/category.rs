//! Category service
//!
//! Category CRUD plus the navigation cache: a single derived entry keyed
//! `nav_categories` holding the first eight categories in name order, with a
//! one-hour TTL. Every category mutation invalidates it immediately; the
//! next read recomputes and repopulates. Cache failures are swallowed; the
//! store remains the source of truth.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::slug::generate_unique_slug;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Cache key for the navigation category list
pub const NAV_CACHE_KEY: &str = "nav_categories";

/// Number of categories shown in navigation
pub const NAV_CATEGORY_LIMIT: i64 = 8;

/// TTL for the navigation cache entry (1 hour)
pub const NAV_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate category name
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: Arc<MemoryCache>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Create a new category
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_name(&name)
            .await
            .context("Failed to check category name")?
        {
            return Err(CategoryServiceError::DuplicateName(name));
        }

        let slug = generate_unique_slug(&name, |probe| {
            let repo = self.repo.clone();
            async move { repo.exists_by_slug(&probe).await }
        })
        .await
        .context("Failed to generate category slug")?;

        let category = self
            .repo
            .create(&name, &slug)
            .await
            .context("Failed to create category")?;

        self.invalidate_nav_cache().await;
        Ok(category)
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(slug.to_string()))
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Rename a category
    ///
    /// A name change regenerates the slug; an unchanged name keeps it.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(id.to_string()))?;

        let name = match input.name {
            Some(name) => name.trim().to_string(),
            None => return Ok(existing),
        };
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        if name == existing.name {
            return Ok(existing);
        }

        if self
            .repo
            .exists_by_name_excluding(&name, id)
            .await
            .context("Failed to check category name")?
        {
            return Err(CategoryServiceError::DuplicateName(name));
        }

        let slug = generate_unique_slug(&name, |probe| {
            let repo = self.repo.clone();
            async move { repo.exists_by_slug(&probe).await }
        })
        .await
        .context("Failed to generate category slug")?;

        let category = self
            .repo
            .update(id, &name, Some(&slug))
            .await
            .context("Failed to update category")?;

        self.invalidate_nav_cache().await;
        Ok(category)
    }

    /// Delete a category; referencing posts keep existing but lose the link
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?;
        if existing.is_none() {
            return Err(CategoryServiceError::NotFound(id.to_string()));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        self.invalidate_nav_cache().await;
        Ok(())
    }

    /// Navigation categories: cached first eight in name order.
    ///
    /// On a cache miss the list is recomputed from the store and cached with
    /// the standard TTL.
    pub async fn nav_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        if let Some(cached) = self
            .cache
            .get::<Vec<Category>>(NAV_CACHE_KEY)
            .await
            .ok()
            .flatten()
        {
            return Ok(cached);
        }

        let categories = self
            .repo
            .list_first(NAV_CATEGORY_LIMIT)
            .await
            .context("Failed to list navigation categories")?;

        if let Err(e) = self
            .cache
            .set(NAV_CACHE_KEY, &categories, NAV_CACHE_TTL)
            .await
        {
            tracing::warn!("Failed to populate navigation cache: {}", e);
        }

        Ok(categories)
    }

    /// Drop the navigation cache entry. Best-effort.
    pub async fn invalidate_nav_cache(&self) {
        if let Err(e) = self.cache.delete(NAV_CACHE_KEY).await {
            tracing::warn!("Failed to invalidate navigation cache: {}", e);
        }
    }
}
