//! Asset manifests
//!
//! A manifest is the authoritative list of every object belonging to one
//! asset. It is stored as JSON next to the objects it describes, at
//! `{basePath}manifest.json`:
//!
//! ```json
//! {
//!   "original": {"key": "...", "url": "...", "contentType": "image/png", "size": 12345},
//!   "variants": {
//!     "WEB": {"key": "...", "url": "...", "contentType": "image/png", "size": 9876}
//!   }
//! }
//! ```
//!
//! Absent optional fields are omitted. `variants` is always written, as an
//! empty object for non-image assets, and defaults to empty when decoding.

use crate::error::{MediaError, MediaResult};
use crate::store::ObjectStoreGateway;
use crate::variant::MediaVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content type under which manifests are stored
pub const MANIFEST_CONTENT_TYPE: &str = "application/json";

/// One physical object in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFileDescriptor {
    /// Object key
    pub key: String,

    /// Public URL of the object
    pub url: String,

    /// MIME type the object was stored with
    pub content_type: String,

    /// Size in bytes
    pub size: u64,

    /// Pixel width, for image artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Pixel height, for image artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MediaFileDescriptor {
    /// Creates a descriptor without dimensions
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        url: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            content_type: content_type.into(),
            size,
            width: None,
            height: None,
        }
    }

    /// Sets pixel dimensions
    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Persisted record of one logical asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaManifest {
    /// The stored original
    pub original: MediaFileDescriptor,

    /// Derived renditions; only ever populated for images
    #[serde(default)]
    pub variants: BTreeMap<MediaVariant, MediaFileDescriptor>,
}

impl MediaManifest {
    /// Creates a manifest with no variants
    #[must_use]
    pub const fn new(original: MediaFileDescriptor) -> Self {
        Self {
            original,
            variants: BTreeMap::new(),
        }
    }

    /// Every object key the manifest references, original first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.original.key.as_str())
            .chain(self.variants.values().map(|d| d.key.as_str()))
    }
}

/// Reads and writes manifests as JSON objects
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestCodec;

impl ManifestCodec {
    /// Serializes a manifest to JSON bytes
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if serialization fails.
    pub fn encode(manifest: &MediaManifest) -> MediaResult<Vec<u8>> {
        Ok(serde_json::to_vec(manifest)?)
    }

    /// Parses a manifest from JSON bytes
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if the bytes are not a valid manifest.
    pub fn decode(bytes: &[u8]) -> MediaResult<MediaManifest> {
        serde_json::from_slice(bytes).map_err(|e| MediaError::storage_with("invalid manifest", e))
    }

    /// Stores a manifest at `manifest_key`
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if serialization or the put fails.
    #[tracing::instrument(skip(gateway, manifest))]
    pub async fn write(
        gateway: &ObjectStoreGateway,
        manifest_key: &str,
        manifest: &MediaManifest,
    ) -> MediaResult<()> {
        let bytes = Self::encode(manifest)?;
        gateway.put(manifest_key, MANIFEST_CONTENT_TYPE, bytes.into()).await
    }

    /// Loads the manifest stored at `manifest_key`
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if the object is missing, unreadable or
    /// not a valid manifest.
    #[tracing::instrument(skip(gateway))]
    pub async fn read(gateway: &ObjectStoreGateway, manifest_key: &str) -> MediaResult<MediaManifest> {
        let bytes = gateway.get(manifest_key).await?;
        Self::decode(&bytes).map_err(|e| match e {
            MediaError::Storage { source, .. } => MediaError::Storage {
                message: format!("invalid manifest at {manifest_key}"),
                source,
            },
            other => other,
        })
    }
}
