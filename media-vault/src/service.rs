//! Media storage orchestrator
//!
//! [`MediaStorageService`] composes policy validation, key layout, variant
//! rendering, the object store gateway and the manifest codec into the four
//! asset-level operations: store, store-all, replace and delete.
//!
//! # Failure model
//!
//! Each call runs its steps in order and stops at the first failure. Nothing
//! is rolled back: objects written before the failure stay behind as orphans
//! under a base path no manifest points to. The manifest is always the last
//! write, so a manifest never references an object that was not stored.
//! Retrying a failed call is safe because every call draws a fresh base path.
//!
//! # Examples
//!
//! ```rust
//! use media_vault::{MediaKind, MediaStorageService, MediaUpload};
//! use media_vault::store::MemoryObjectStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = MediaStorageService::new(Arc::new(MemoryObjectStore::new("media")), None);
//!
//! let upload = MediaUpload::new(
//!     Some("cv.pdf".to_string()),
//!     Some("application/pdf".to_string()),
//!     b"%PDF-1.7".to_vec(),
//! );
//! let asset = service.store(MediaKind::Document, "resumes", &upload).await?;
//! assert!(asset.manifest.variants.is_empty());
//!
//! service.delete(Some(&asset.manifest)).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::MediaVaultConfig;
use crate::error::{MediaError, MediaResult};
use crate::keys::{self, KeyBuilder};
use crate::kind::{extension_for_mime, normalize_mime, resolve_extension, MediaKind};
use crate::manifest::{ManifestCodec, MediaFileDescriptor, MediaManifest};
use crate::store::{ObjectStore, ObjectStoreGateway};
use crate::types::{MediaAsset, MediaUpload};
use crate::variant::{MediaVariant, VariantDefinition, VariantPlanner, VARIANT_DEFINITIONS};
use chrono::Utc;
use futures_util::future::try_join_all;
use image::DynamicImage;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Most images accepted by one [`MediaStorageService::store_all`] call
pub const MAX_IMAGES_PER_BATCH: usize = 100;

const ENCODABLE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Stores, replaces and deletes logical media assets
///
/// Holds no state between calls besides its collaborators, so one instance
/// can serve concurrent calls for independent assets.
#[derive(Debug, Clone)]
pub struct MediaStorageService {
    gateway: ObjectStoreGateway,
    keys: KeyBuilder,
    planner: VariantPlanner,
    parallel_variants: bool,
}

impl MediaStorageService {
    /// Creates a service over `store`
    ///
    /// Descriptor URLs use `public_base_url` when given, otherwise the
    /// backend's default URL.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: Option<String>) -> Self {
        let keys = KeyBuilder::new(public_base_url, store.default_base_url());
        Self {
            gateway: ObjectStoreGateway::new(store),
            keys,
            planner: VariantPlanner::new(),
            parallel_variants: true,
        }
    }

    /// Creates a service over `store` using loaded configuration
    #[must_use]
    pub fn from_config(store: Arc<dyn ObjectStore>, config: &MediaVaultConfig) -> Self {
        Self::new(store, config.storage.public_base_url.clone())
            .with_parallel_variants(config.media.parallel_variants)
    }

    /// Creates a service backed by the configured S3 bucket
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] if the storage settings are
    /// incomplete.
    #[cfg(feature = "s3")]
    pub async fn connect(config: &MediaVaultConfig) -> MediaResult<Self> {
        let store = crate::store::S3ObjectStore::from_settings(&config.storage).await?;
        Ok(Self::from_config(Arc::new(store), config))
    }

    /// Uses a specific variant planner
    #[must_use]
    pub const fn with_planner(mut self, planner: VariantPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Renders variants concurrently (`true`) or one after another
    #[must_use]
    pub const fn with_parallel_variants(mut self, parallel: bool) -> Self {
        self.parallel_variants = parallel;
        self
    }

    /// The gateway this service writes through
    #[must_use]
    pub const fn gateway(&self) -> &ObjectStoreGateway {
        &self.gateway
    }

    /// Stores one upload as a new asset
    ///
    /// Validates, uploads the original, renders and uploads every variant for
    /// images, then writes the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] for empty content, a rejected MIME
    /// type or size, an unresolvable extension or a blank purpose; nothing is
    /// written in that case. Returns [`MediaError::Storage`] if a put or the
    /// image codec fails; objects written before the failure are left behind.
    #[tracing::instrument(skip(self, upload), fields(size = upload.size()))]
    pub async fn store(
        &self,
        kind: MediaKind,
        purpose: &str,
        upload: &MediaUpload,
    ) -> MediaResult<MediaAsset> {
        if upload.is_empty() {
            return Err(MediaError::validation("upload content is empty"));
        }

        let mime = upload
            .content_type
            .as_deref()
            .map(normalize_mime)
            .unwrap_or_default();
        kind.validate(Some(mime.as_str()), upload.size())?;
        let extension = resolve_extension(upload.original_filename.as_deref(), Some(mime.as_str()))?;

        let base_path = self.keys.base_path(kind, purpose, &upload.content, Utc::now())?;
        let original_key = keys::original_key(&base_path, &extension);

        self.gateway
            .put(&original_key, &mime, upload.content.clone())
            .await?;
        let mut original = MediaFileDescriptor::new(
            original_key.as_str(),
            self.keys.public_url(&original_key),
            mime.as_str(),
            upload.size(),
        );

        let mut variants = BTreeMap::new();
        if kind.has_variants() {
            let planner = self.planner;
            let content = upload.content.clone();
            let source = run_blocking(move || planner.decode(&content)).await?;
            original = original.with_dimensions(source.width(), source.height());

            let extension = variant_extension(&extension, &mime);
            variants = self
                .store_variants(&base_path, Arc::new(source), extension)
                .await?;
        }

        let manifest = MediaManifest { original, variants };
        let manifest_key = keys::manifest_key(&base_path);
        ManifestCodec::write(&self.gateway, &manifest_key, &manifest).await?;

        tracing::info!(
            manifest_key = %manifest_key,
            variants = manifest.variants.len(),
            "Stored media asset"
        );

        Ok(MediaAsset {
            base_path,
            manifest_key,
            manifest,
        })
    }

    /// Stores several uploads as independent assets, in input order
    ///
    /// Stops at the first failure and returns only that error; assets
    /// stored earlier in the batch are not removed.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] if `uploads` is empty, or holds
    /// more than [`MAX_IMAGES_PER_BATCH`] images; otherwise the first error
    /// from [`MediaStorageService::store`].
    #[tracing::instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn store_all(
        &self,
        kind: MediaKind,
        purpose: &str,
        uploads: &[MediaUpload],
    ) -> MediaResult<Vec<MediaAsset>> {
        if uploads.is_empty() {
            return Err(MediaError::validation("at least one file is required"));
        }
        if kind == MediaKind::Image && uploads.len() > MAX_IMAGES_PER_BATCH {
            return Err(MediaError::validation(format!(
                "between 1 and {MAX_IMAGES_PER_BATCH} images may be uploaded at once, got {}",
                uploads.len()
            )));
        }

        let mut assets = Vec::with_capacity(uploads.len());
        for upload in uploads {
            assets.push(self.store(kind, purpose, upload).await?);
        }
        Ok(assets)
    }

    /// Stores `upload` and then deletes the asset it supersedes
    ///
    /// The old asset is only touched once the new one is fully stored, so a
    /// failed replace leaves the caller with the old asset intact.
    ///
    /// # Errors
    ///
    /// Returns any error from [`MediaStorageService::store`] (the old asset
    /// is untouched), or a [`MediaError::Storage`] from deleting the old
    /// asset (the new asset is already stored).
    #[tracing::instrument(skip(self, existing, upload), fields(size = upload.size()))]
    pub async fn replace(
        &self,
        existing: Option<&MediaManifest>,
        kind: MediaKind,
        purpose: &str,
        upload: &MediaUpload,
    ) -> MediaResult<MediaAsset> {
        let asset = self.store(kind, purpose, upload).await?;

        if let Some(old) = existing {
            self.delete(Some(old)).await.inspect_err(|e| {
                tracing::error!(
                    new_manifest = %asset.manifest_key,
                    old_original = %old.original.key,
                    error = %e,
                    "Stored replacement but failed to delete superseded asset"
                );
            })?;
        }

        Ok(asset)
    }

    /// Deletes every object a manifest references, then the manifest itself
    ///
    /// `None` is a no-op. Objects that are already gone are skipped, which
    /// makes repeated deletes succeed.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] on the first delete that fails for a
    /// reason other than "not found"; remaining deletes are not attempted.
    #[tracing::instrument(skip(self, manifest), fields(original = manifest.map(|m| m.original.key.as_str())))]
    pub async fn delete(&self, manifest: Option<&MediaManifest>) -> MediaResult<()> {
        let Some(manifest) = manifest else {
            return Ok(());
        };

        for key in manifest.keys() {
            self.gateway.delete(key).await?;
        }
        self.gateway
            .delete(&keys::manifest_key_for_original(&manifest.original.key))
            .await?;

        tracing::info!(original = %manifest.original.key, "Deleted media asset");
        Ok(())
    }

    /// Loads a stored manifest by key
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if the manifest is missing or invalid.
    pub async fn load(&self, manifest_key: &str) -> MediaResult<MediaManifest> {
        ManifestCodec::read(&self.gateway, manifest_key).await
    }

    async fn store_variants(
        &self,
        base_path: &str,
        source: Arc<DynamicImage>,
        extension: &str,
    ) -> MediaResult<BTreeMap<MediaVariant, MediaFileDescriptor>> {
        let jobs = VARIANT_DEFINITIONS
            .iter()
            .map(|definition| self.store_variant(base_path, Arc::clone(&source), definition, extension));

        let descriptors = if self.parallel_variants {
            try_join_all(jobs).await?
        } else {
            let mut descriptors = Vec::with_capacity(VARIANT_DEFINITIONS.len());
            for job in jobs {
                descriptors.push(job.await?);
            }
            descriptors
        };

        Ok(VARIANT_DEFINITIONS
            .iter()
            .map(|d| d.variant)
            .zip(descriptors)
            .collect())
    }

    async fn store_variant(
        &self,
        base_path: &str,
        source: Arc<DynamicImage>,
        definition: &'static VariantDefinition,
        extension: &str,
    ) -> MediaResult<MediaFileDescriptor> {
        let planner = self.planner;
        let target = extension.to_string();
        let rendered = run_blocking(move || planner.generate(&source, definition, &target)).await?;

        let key = keys::variant_key(base_path, definition.variant, extension);
        let size = rendered.data.len() as u64;
        self.gateway
            .put(&key, rendered.content_type, rendered.data.into())
            .await?;

        Ok(MediaFileDescriptor::new(
            key.as_str(),
            self.keys.public_url(&key),
            rendered.content_type,
            size,
        )
        .with_dimensions(rendered.width, rendered.height))
    }
}

/// Extension variants are encoded as
///
/// Keeps the original's extension when an encoder exists for it, otherwise
/// falls back to the canonical extension of the upload's MIME type.
fn variant_extension<'a>(extension: &'a str, mime: &str) -> &'a str {
    if ENCODABLE_EXTENSIONS.contains(&extension) {
        extension
    } else {
        extension_for_mime(mime).unwrap_or(extension)
    }
}

/// Runs codec work on the blocking pool
async fn run_blocking<T, F>(task: F) -> MediaResult<T>
where
    F: FnOnce() -> MediaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| MediaError::storage_with("image processing task failed", e))?
}
