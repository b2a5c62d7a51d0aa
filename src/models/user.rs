//! User model
//!
//! This module defines the User entity for the Gazette blog service. Staff
//! users hold moderation privileges across all content regardless of
//! authorship.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff flag; staff can moderate any content
    pub is_staff: bool,
    /// Active flag; inactive accounts cannot authenticate
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user may edit or delete content owned by `author_id`.
    ///
    /// Staff can edit any content; everyone else only their own.
    pub fn can_edit(&self, author_id: i64) -> bool {
        self.is_staff || self.id == author_id
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    pub password_hash: String,
    /// Staff flag
    pub is_staff: bool,
}
