//! Session model
//!
//! Server-side login sessions. The ID doubles as the bearer token handed to
//! clients; the account service generates it and fixes the lifetime at
//! creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login session tied to one user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token, also the primary key
    pub id: String,
    /// Owning user ID
    pub user_id: i64,
    /// Expiry; past this instant the session no longer authenticates
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
