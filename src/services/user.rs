//! User account service
//!
//! Registration, login, logout, and session-token authentication. Sessions
//! are opaque random tokens with a fixed lifetime, stored server-side. A
//! welcome message is dispatched best-effort on registration.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, User};
use crate::services::email::NotificationDispatcher;
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Session lifetime (7 days)
const SESSION_LIFETIME_DAYS: i64 = 7;

/// Minimum password length in characters
const MIN_PASSWORD_LENGTH: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Wrong username/password, or inactive account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Email already registered
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User account service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            sessions,
            dispatcher,
        }
    }

    /// Register a new account
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self
            .users
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UsernameTaken(username.to_string()));
        }
        if self
            .users
            .get_by_email(email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::EmailTaken(email.to_string()));
        }

        let password_hash = hash_password(password).context("Failed to hash password")?;
        let user = self
            .users
            .create(&CreateUserInput {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                is_staff: false,
            })
            .await
            .context("Failed to create user")?;

        if let Err(e) = self.dispatcher.dispatch_welcome(&user.email, &user.username).await {
            tracing::warn!("Welcome message dispatch failed: {}", e);
        }

        tracing::info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    /// Authenticate by username and password, creating a session.
    ///
    /// Unknown usernames, wrong passwords, and inactive accounts all report
    /// the same `InvalidCredentials` error.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let user = self
            .users
            .get_by_username(username.trim())
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !user.is_active {
            return Err(UserServiceError::InvalidCredentials);
        }

        let matches = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !matches {
            return Err(UserServiceError::InvalidCredentials);
        }

        // Opportunistic cleanup; stale rows never authenticate anyway
        match self.sessions.delete_expired().await {
            Ok(removed) if removed > 0 => {
                tracing::debug!("Removed {} expired sessions", removed);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Expired session cleanup failed: {}", e),
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);
        let session = self
            .sessions
            .create(&token, user.id, expires_at)
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Destroy a session
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.sessions
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight; inactive users resolve to
    /// None.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self
            .sessions
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        else {
            return Ok(None);
        };

        if session.is_expired() {
            let _ = self.sessions.delete(token).await;
            return Ok(None);
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await
            .context("Failed to look up user")?;

        Ok(user.filter(|u| u.is_active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::services::email::testing::RecordingDispatcher;

    async fn setup() -> (UserService, Arc<RecordingDispatcher>, Arc<dyn UserRepository>) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let service = UserService::new(
            users.clone(),
            SqlxSessionRepository::boxed(pool),
            dispatcher.clone(),
        );
        (service, dispatcher, users)
    }

    #[tokio::test]
    async fn test_register_login_authenticate_roundtrip() {
        let (service, dispatcher, _) = setup().await;

        let user = service
            .register("alice", "alice@example.com", "longpassword")
            .await
            .unwrap();
        assert!(!user.is_staff);
        assert_eq!(
            dispatcher.welcome_recipients.lock().unwrap().as_slice(),
            ["alice@example.com"]
        );

        let (logged_in, session) = service.login("alice", "longpassword").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let resolved = service.authenticate(&session.id).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        service.logout(&session.id).await.unwrap();
        assert!(service.authenticate(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (service, _, _) = setup().await;
        service
            .register("alice", "alice@example.com", "longpassword")
            .await
            .unwrap();

        let result = service.login("alice", "wrongpassword").await;
        assert!(matches!(result, Err(UserServiceError::InvalidCredentials)));

        let result = service.login("nobody", "longpassword").await;
        assert!(matches!(result, Err(UserServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (service, _, _) = setup().await;
        service
            .register("alice", "alice@example.com", "longpassword")
            .await
            .unwrap();

        let result = service
            .register("alice", "other@example.com", "longpassword")
            .await;
        assert!(matches!(result, Err(UserServiceError::UsernameTaken(_))));

        let result = service
            .register("bob", "alice@example.com", "longpassword")
            .await;
        assert!(matches!(result, Err(UserServiceError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_login_or_resolve() {
        let (service, _, users) = setup().await;
        let user = service
            .register("alice", "alice@example.com", "longpassword")
            .await
            .unwrap();
        let (_, session) = service.login("alice", "longpassword").await.unwrap();

        users.set_active(user.id, false).await.unwrap();

        assert!(matches!(
            service.login("alice", "longpassword").await,
            Err(UserServiceError::InvalidCredentials)
        ));
        assert!(service.authenticate(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let (service, _, _) = setup().await;
        let result = service.register("alice", "alice@example.com", "short").await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }
}
