//! Session repository
//!
//! Database operations for authentication sessions. Session IDs are opaque
//! tokens generated by the account service.

use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, id: &str, user_id: i64, expires_at: DateTime<Utc>) -> Result<Session>;

    /// Get session by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete sessions past their expiry, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, id: &str, user_id: i64, expires_at: DateTime<Utc>) -> Result<Session> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(Session {
            id: id.to_string(),
            user_id,
            expires_at,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session")?;

        Ok(row.map(|row| Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup() -> SqlitePool {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('u', 'u@x', 'h')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let pool = setup().await;
        let repo = SqlxSessionRepository::new(pool);

        let expires = Utc::now() + Duration::days(7);
        repo.create("token-1", 1, expires).await.unwrap();

        let session = repo.get_by_id("token-1").await.unwrap().unwrap();
        assert_eq!(session.user_id, 1);
        assert!(!session.is_expired());

        repo.delete("token-1").await.unwrap();
        assert!(repo.get_by_id("token-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_only_removes_stale() {
        let pool = setup().await;
        let repo = SqlxSessionRepository::new(pool);

        repo.create("stale", 1, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        repo.create("fresh", 1, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let removed = repo.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_by_id("stale").await.unwrap().is_none());
        assert!(repo.get_by_id("fresh").await.unwrap().is_some());
    }
}
