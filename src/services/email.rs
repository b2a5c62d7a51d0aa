//! Email notification dispatch
//!
//! Outbound mail for contact-form notifications and account welcome
//! messages. Dispatch is always best-effort: callers log failures and move
//! on, so a down SMTP relay never fails the enclosing request.
//!
//! `NotificationDispatcher` is a trait so tests can substitute a recording
//! stub and assert on dispatch attempts.

use crate::config::MailConfig;
use crate::models::ContactMessage;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Outbound notification dispatcher
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Notify configured recipients about a new contact message
    async fn dispatch_contact_notification(&self, message: &ContactMessage) -> Result<()>;

    /// Send a welcome message to a newly registered account
    async fn dispatch_welcome(&self, email: &str, username: &str) -> Result<()>;
}

/// SMTP-backed dispatcher using lettre
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(self.config.smtp_port);

        if !self.config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        Ok(builder.build())
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        self.transport()?
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpMailer {
    async fn dispatch_contact_notification(&self, message: &ContactMessage) -> Result<()> {
        if !self.config.is_enabled() {
            tracing::debug!("Mail disabled, skipping contact notification");
            return Ok(());
        }

        let subject = match &message.subject {
            Some(s) => format!("New contact message: {}", s),
            None => "New contact message".to_string(),
        };
        let body = format!(
            "From: {} <{}>\n\n{}",
            message.name, message.email, message.message
        );

        for recipient in &self.config.contact_recipients {
            self.send(recipient, &subject, body.clone()).await?;
        }
        Ok(())
    }

    async fn dispatch_welcome(&self, email: &str, username: &str) -> Result<()> {
        if !self.config.is_enabled() {
            tracing::debug!("Mail disabled, skipping welcome message");
            return Ok(());
        }

        let body = format!(
            "Hello {},\n\nYour account has been created. Welcome aboard!\n",
            username
        );
        self.send(email, "Welcome to Gazette", body).await
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Dispatcher stub that records every attempt instead of sending.
    #[derive(Default)]
    pub struct RecordingDispatcher {
        pub contact_attempts: AtomicUsize,
        pub welcome_recipients: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn contact_count(&self) -> usize {
            self.contact_attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn dispatch_contact_notification(&self, _message: &ContactMessage) -> Result<()> {
            self.contact_attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("simulated dispatch failure"));
            }
            Ok(())
        }

        async fn dispatch_welcome(&self, email: &str, _username: &str) -> Result<()> {
            self.welcome_recipients.lock().unwrap().push(email.to_string());
            if self.fail {
                return Err(anyhow!("simulated dispatch failure"));
            }
            Ok(())
        }
    }
}
