//! Deterministic object key layout
//!
//! Every asset lives under one base path:
//!
//! ```text
//! media/{kind}/{purpose}/{yyyy}/{mm}/{dd}/{sha256-prefix-12}-{uuid}/
//! ├── original.{ext}
//! ├── variants/
//! │   ├── web.{ext}
//! │   ├── mobile.{ext}
//! │   └── thumb.{ext}
//! └── manifest.json
//! ```
//!
//! The date partition bounds listing cost and the random suffix keeps two
//! byte-identical uploads apart. The hash prefix only helps humans correlate
//! content; it is not used for deduplication.

use crate::error::{MediaError, MediaResult};
use crate::kind::MediaKind;
use crate::variant::MediaVariant;
use chrono::{DateTime, Datelike, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Root prefix shared by every asset
pub const MEDIA_ROOT: &str = "media";

/// File name of the manifest inside a base path
pub const MANIFEST_FILE: &str = "manifest.json";

const HASH_PREFIX_LEN: usize = 12;
const DEFAULT_PURPOSE: &str = "general";

/// Builds object keys and public URLs
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    /// Configured public base URL (CDN or bucket website)
    public_base_url: Option<String>,

    /// Backend-specific base used when no public base URL is configured
    default_base_url: String,
}

impl KeyBuilder {
    /// Creates a key builder
    ///
    /// `public_base_url` takes precedence; `default_base_url` is the
    /// backend-specific fallback.
    #[must_use]
    pub fn new(public_base_url: Option<String>, default_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.filter(|u| !u.trim().is_empty()),
            default_base_url: default_base_url.into(),
        }
    }

    /// Builds the base path for a new asset
    ///
    /// Two calls with identical arguments return different paths that share
    /// the same hash prefix.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] if `purpose` is blank.
    pub fn base_path(
        &self,
        kind: MediaKind,
        purpose: &str,
        content: &[u8],
        now: DateTime<Utc>,
    ) -> MediaResult<String> {
        if purpose.trim().is_empty() {
            return Err(MediaError::validation("purpose must not be blank"));
        }

        let hash = hex::encode(Sha256::digest(content));
        Ok(format!(
            "{MEDIA_ROOT}/{kind}/{purpose}/{year:04}/{month:02}/{day:02}/{prefix}-{id}/",
            purpose = sanitize_purpose(purpose),
            year = now.year(),
            month = now.month(),
            day = now.day(),
            prefix = &hash[..HASH_PREFIX_LEN],
            id = Uuid::new_v4(),
        ))
    }

    /// Returns the public URL of an object key
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        let base = self
            .public_base_url
            .as_deref()
            .unwrap_or(&self.default_base_url);
        join_url(base, key)
    }
}

/// Key of the stored original
#[must_use]
pub fn original_key(base_path: &str, extension: &str) -> String {
    format!("{base_path}original.{extension}")
}

/// Key of a stored variant
#[must_use]
pub fn variant_key(base_path: &str, variant: MediaVariant, extension: &str) -> String {
    format!("{base_path}variants/{}.{extension}", variant.as_path_segment())
}

/// Key of the manifest under a base path
#[must_use]
pub fn manifest_key(base_path: &str) -> String {
    format!("{base_path}{MANIFEST_FILE}")
}

/// Derives the manifest key from the original's key
///
/// Strips the trailing segment and appends `manifest.json`.
#[must_use]
pub fn manifest_key_for_original(original_key: &str) -> String {
    let base = original_key
        .rfind('/')
        .map_or("", |idx| &original_key[..=idx]);
    manifest_key(base)
}

/// Normalizes a logical purpose into a single safe path segment
///
/// Lower-cases, replaces anything outside `[a-z0-9-]` with `-`, collapses
/// runs of `-` and trims them from both ends. An empty result becomes
/// `general`.
#[must_use]
pub fn sanitize_purpose(purpose: &str) -> String {
    let mut out = String::with_capacity(purpose.len());
    for c in purpose.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }

    while out.ends_with('-') {
        out.pop();
    }

    if out.is_empty() {
        DEFAULT_PURPOSE.to_string()
    } else {
        out
    }
}

fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
