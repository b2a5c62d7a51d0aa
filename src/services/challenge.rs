//! Human-verification challenge
//!
//! Server-side verification of challenge tokens (Turnstile-style providers).
//! The provider is reached over HTTP with the secret key and the client's
//! response token; the JSON reply carries a `success` flag.
//!
//! `ChallengeVerifier` is a trait so the contact intake gate can be tested
//! without network access.

use crate::config::ChallengeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for the external verification call
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// External challenge verification
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    /// Verify a client-supplied token; Ok(false) means the token was
    /// rejected by the provider
    async fn verify(&self, token: &str) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// HTTP verifier posting to the provider's siteverify endpoint
pub struct HttpChallengeVerifier {
    client: reqwest::Client,
    config: ChallengeConfig,
}

impl HttpChallengeVerifier {
    pub fn new(config: ChallengeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChallengeVerifier for HttpChallengeVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        let secret = self
            .config
            .secret_key
            .as_deref()
            .context("Challenge secret key not configured")?;

        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .context("Challenge verification request failed")?;

        let body: VerifyResponse = response
            .json()
            .await
            .context("Invalid challenge verification response")?;

        Ok(body.success)
    }
}
