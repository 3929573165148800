//! Pipeline input and output types

use crate::manifest::MediaManifest;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An upload handed to the pipeline
///
/// Not retained beyond the call that receives it.
///
/// # Examples
///
/// ```rust
/// use media_vault::MediaUpload;
///
/// let upload = MediaUpload::new(
///     Some("report.pdf".to_string()),
///     Some("application/pdf".to_string()),
///     vec![0x25, 0x50, 0x44, 0x46],
/// );
/// assert_eq!(upload.size(), 4);
/// assert!(!upload.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Filename supplied by the client, if any
    pub original_filename: Option<String>,

    /// MIME type supplied by the client, if any
    pub content_type: Option<String>,

    /// Payload
    pub content: Bytes,
}

impl MediaUpload {
    /// Creates an upload
    #[must_use]
    pub fn new(
        original_filename: Option<String>,
        content_type: Option<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            original_filename,
            content_type,
            content: content.into(),
        }
    }

    /// Payload size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Returns true if the payload has no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A stored logical asset
///
/// `base_path` is the unit of ownership: every object under it, the manifest
/// included, belongs to this asset alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    /// Common key prefix of every object in the asset
    pub base_path: String,

    /// Key of the stored manifest
    pub manifest_key: String,

    /// The manifest as written
    pub manifest: MediaManifest,
}

impl fmt::Display for MediaAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MediaAsset(manifest={}, variants={}, size={})",
            self.manifest_key,
            self.manifest.variants.len(),
            self.manifest.original.size
        )
    }
}
