//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity. Posts reference a category optionally; deleting a
/// category orphans its posts rather than deleting them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Category name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name (unique); the slug is derived from it
    pub name: String,
}

/// Input for updating an existing category
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name (optional; changing it regenerates the slug)
    pub name: Option<String>,
}
