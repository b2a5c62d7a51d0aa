//! Contact message repository
//!
//! Database operations for messages left through the contact form.

use crate::models::ContactMessage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Contact message repository trait
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    /// Store a validated contact message
    async fn create(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<ContactMessage>;

    /// Get message by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>>;

    /// List messages newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ContactMessage>>;

    /// Count all messages
    async fn count(&self) -> Result<i64>;

    /// Set the read flag
    async fn set_read(&self, id: i64, read: bool) -> Result<()>;

    /// Delete a message
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based contact message repository implementation
pub struct SqlxContactMessageRepository {
    pool: SqlitePool,
}

impl SqlxContactMessageRepository {
    /// Create a new SQLx contact message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ContactMessageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactMessageRepository for SqlxContactMessageRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<ContactMessage> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, subject, message, read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(subject)
        .bind(message)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create contact message")?;

        Ok(ContactMessage {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.map(|s| s.to_string()),
            message: message.to_string(),
            read: false,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>> {
        let row = sqlx::query(
            "SELECT id, name, email, subject, message, read, created_at \
             FROM contact_messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get contact message")?;

        Ok(row.map(|row| row_to_message(&row)))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ContactMessage>> {
        let rows = sqlx::query(
            "SELECT id, name, email, subject, message, read, created_at \
             FROM contact_messages ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contact messages")?;

        Ok(rows.iter().map(row_to_message).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM contact_messages")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count contact messages")?;
        Ok(row.get("count"))
    }

    async fn set_read(&self, id: i64, read: bool) -> Result<()> {
        sqlx::query("UPDATE contact_messages SET read = ? WHERE id = ?")
            .bind(read)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update read flag")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete contact message")?;
        Ok(())
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        subject: row.get("subject"),
        message: row.get("message"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_repo() -> SqlxContactMessageRepository {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxContactMessageRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = setup_repo().await;

        repo.create("Ann", "ann@example.com", None, "First message body")
            .await
            .unwrap();
        repo.create("Ben", "ben@example.com", Some("Hi"), "Second message body")
            .await
            .unwrap();

        let messages = repo.list(0, 10).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].name, "Ben");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_read_toggle() {
        let repo = setup_repo().await;
        let msg = repo
            .create("Ann", "ann@example.com", None, "A message body here")
            .await
            .unwrap();
        assert!(!msg.read);

        repo.set_read(msg.id, true).await.unwrap();
        assert!(repo.get_by_id(msg.id).await.unwrap().unwrap().read);

        repo.set_read(msg.id, false).await.unwrap();
        assert!(!repo.get_by_id(msg.id).await.unwrap().unwrap().read);
    }
}
