//! Contact message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum contact message body length in characters
pub const MIN_MESSAGE_LENGTH: usize = 10;

/// Inbound message left through the contact form. Creatable by anonymous
/// visitors; only staff read and toggle them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email address
    pub email: String,
    /// Subject line (optional)
    pub subject: Option<String>,
    /// Message body
    pub message: String,
    /// Whether a staff member has read the message
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Raw contact form submission, before validation.
///
/// `honeypot` is a hidden field legitimate users never fill in; any non-empty
/// value flags an automated submission. `challenge_token` carries the
/// human-verification response when the challenge is configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub honeypot: String,
    #[serde(default)]
    pub challenge_token: Option<String>,
}
