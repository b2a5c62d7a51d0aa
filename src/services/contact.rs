//! Contact intake gate
//!
//! Validates and persists inbound contact-form submissions:
//! - message body must be at least 10 characters
//! - a hidden honeypot field must stay empty; bots that fill it get a
//!   generic rejection that does not reveal the mechanism, and nothing is
//!   persisted
//! - when the human-verification challenge is configured, a token is
//!   required and verified externally before acceptance
//!
//! On success the message is stored unread and exactly one notification
//! dispatch is attempted; dispatch failure is logged and swallowed.

use crate::db::repositories::ContactMessageRepository;
use crate::models::{ContactMessage, ContactSubmission, MIN_MESSAGE_LENGTH};
use crate::services::challenge::ChallengeVerifier;
use crate::services::email::NotificationDispatcher;
use anyhow::Context;
use std::sync::Arc;

/// Error types for contact intake operations
#[derive(Debug, thiserror::Error)]
pub enum ContactServiceError {
    /// Field-level validation failure
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Generic rejection; deliberately unspecific
    #[error("Unable to process submission")]
    Rejected,

    /// Message not found (staff operations)
    #[error("Contact message not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Contact intake service
pub struct ContactService {
    repo: Arc<dyn ContactMessageRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    verifier: Option<Arc<dyn ChallengeVerifier>>,
}

impl ContactService {
    /// Create a new contact service.
    ///
    /// `verifier` is present only when the challenge is configured; without
    /// it, submissions are accepted with no token.
    pub fn new(
        repo: Arc<dyn ContactMessageRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        verifier: Option<Arc<dyn ChallengeVerifier>>,
    ) -> Self {
        Self {
            repo,
            dispatcher,
            verifier,
        }
    }

    /// Process a contact form submission
    pub async fn submit(
        &self,
        submission: ContactSubmission,
    ) -> Result<ContactMessage, ContactServiceError> {
        if !submission.honeypot.is_empty() {
            tracing::warn!("Contact submission rejected by honeypot");
            return Err(ContactServiceError::Rejected);
        }

        let name = submission.name.trim();
        if name.is_empty() {
            return Err(ContactServiceError::ValidationError(
                "Name is required".to_string(),
            ));
        }

        let email = submission.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ContactServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }

        if submission.message.chars().count() < MIN_MESSAGE_LENGTH {
            return Err(ContactServiceError::ValidationError(format!(
                "Message must be at least {} characters",
                MIN_MESSAGE_LENGTH
            )));
        }

        if let Some(ref verifier) = self.verifier {
            let token = submission
                .challenge_token
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    ContactServiceError::ValidationError(
                        "Verification is required".to_string(),
                    )
                })?;

            let passed = verifier
                .verify(token)
                .await
                .context("Challenge verification failed")?;
            if !passed {
                return Err(ContactServiceError::ValidationError(
                    "Verification failed, please try again".to_string(),
                ));
            }
        }

        let subject = submission
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let message = self
            .repo
            .create(name, email, subject, submission.message.trim())
            .await
            .context("Failed to store contact message")?;

        // Best-effort: a failed dispatch never affects the stored message
        if let Err(e) = self.dispatcher.dispatch_contact_notification(&message).await {
            tracing::warn!("Contact notification dispatch failed: {}", e);
        }

        Ok(message)
    }

    /// List messages newest first (staff)
    pub async fn list(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ContactMessage>, i64), ContactServiceError> {
        let items = self
            .repo
            .list(offset, limit)
            .await
            .context("Failed to list contact messages")?;
        let total = self
            .repo
            .count()
            .await
            .context("Failed to count contact messages")?;
        Ok((items, total))
    }

    /// Toggle the read flag (staff)
    pub async fn set_read(&self, id: i64, read: bool) -> Result<ContactMessage, ContactServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get contact message")?;
        if existing.is_none() {
            return Err(ContactServiceError::NotFound(id));
        }

        self.repo
            .set_read(id, read)
            .await
            .context("Failed to update read flag")?;

        self.repo
            .get_by_id(id)
            .await
            .context("Failed to reload contact message")?
            .ok_or(ContactServiceError::NotFound(id))
    }
}
