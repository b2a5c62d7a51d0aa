//! Tag service
//!
//! Tag lookup and creation. Tags are created on demand when posts are
//! saved; `resolve_names` maps a list of human names to tag IDs, creating
//! any that do not exist yet.

use crate::db::repositories::TagRepository;
use crate::models::Tag;
use crate::services::slug::generate_unique_slug;
use anyhow::Context;
use std::sync::Arc;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// List all tags ordered by name
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.repo.list().await.context("Failed to list tags")?)
    }

    /// Get tag by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(slug.to_string()))
    }

    /// Map tag names to IDs, creating missing tags.
    ///
    /// Names are trimmed; empty names are skipped. Existing tags are matched
    /// by exact name.
    pub async fn resolve_names(&self, names: &[String]) -> Result<Vec<i64>, TagServiceError> {
        let mut ids = Vec::with_capacity(names.len());

        for raw in names {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }

            if let Some(tag) = self
                .repo
                .get_by_name(name)
                .await
                .context("Failed to look up tag")?
            {
                if !ids.contains(&tag.id) {
                    ids.push(tag.id);
                }
                continue;
            }

            let slug = generate_unique_slug(name, |probe| {
                let repo = self.repo.clone();
                async move { repo.exists_by_slug(&probe).await }
            })
            .await
            .context("Failed to generate tag slug")?;

            let tag = self
                .repo
                .create(name, &slug)
                .await
                .context("Failed to create tag")?;
            ids.push(tag.id);
        }

        Ok(ids)
    }
}
