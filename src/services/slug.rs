//! Slug generation
//!
//! Normalizes titles to URL-safe tokens and resolves collisions by probing
//! with ascending numeric suffixes. The existence check is supplied by the
//! caller so one generator serves posts, categories, and tags alike.

use anyhow::Result;
use std::future::Future;

/// Normalize text to a URL-safe lowercase slug.
///
/// Keeps ASCII alphanumerics, collapses every other run of characters into a
/// single hyphen, and trims leading/trailing hyphens. May return an empty
/// string when the input has no usable characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_hyphen = true;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Generate a unique slug from candidate text.
///
/// The base slug is probed against `exists`; on collision, `-1`, `-2`, ...
/// are appended until a free value is found. Text that normalizes to nothing
/// falls back to an opaque random token before probing, so the loop always
/// starts from a non-empty base.
///
/// Probing is read-only; the caller persists the returned slug.
pub async fn generate_unique_slug<F, Fut>(candidate: &str, exists: F) -> Result<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut base = slugify(candidate);
    if base.is_empty() {
        base = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    }

    if !exists(base.clone()).await? {
        return Ok(base);
    }

    let mut extension: u64 = 1;
    loop {
        let probe = format!("{}-{}", base, extension);
        if !exists(probe.clone()).await? {
            return Ok(probe);
        }
        extension += 1;
    }
}
