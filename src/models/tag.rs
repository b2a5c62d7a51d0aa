//! Tag model

use serde::{Deserialize, Serialize};

/// Tag entity. Tags relate to posts many-to-many and enable cross-category
/// content discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Tag name (unique)
    pub name: String,
}
