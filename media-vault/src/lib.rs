//! media-vault: media asset storage on S3-compatible object stores
//!
//! Stores uploaded files as logical assets. Each asset owns a unique key
//! prefix holding the original, resized renditions for images, and a JSON
//! manifest listing every object the asset owns.
//!
//! ```text
//! media/{kind}/{purpose}/{yyyy}/{mm}/{dd}/{sha256[..12]}-{uuid}/
//!     original.{ext}
//!     variants/web.{ext}
//!     variants/mobile.{ext}
//!     variants/thumb.{ext}
//!     manifest.json
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use media_vault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     media_vault::observability::init()?;
//!
//!     let config = MediaVaultConfig::load()?;
//!     let service = MediaStorageService::connect(&config).await?;
//!
//!     let upload = MediaUpload::new(
//!         Some("me.png".to_string()),
//!         Some("image/png".to_string()),
//!         std::fs::read("me.png")?,
//!     );
//!     let asset = service.store(MediaKind::Image, "avatar", &upload).await?;
//!     println!("{}", asset.manifest.original.url);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `s3` - AWS S3 backend via `aws-sdk-s3` (default)

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod keys;
pub mod kind;
pub mod manifest;
pub mod observability;
pub mod service;
pub mod store;
pub mod types;
pub mod variant;

pub use config::MediaVaultConfig;
pub use error::{MediaError, MediaResult};
pub use kind::MediaKind;
pub use manifest::{MediaFileDescriptor, MediaManifest};
pub use service::MediaStorageService;
pub use types::{MediaAsset, MediaUpload};
pub use variant::MediaVariant;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use media_vault::prelude::*;
    //! ```

    pub use crate::config::{MediaSettings, MediaVaultConfig, StorageSettings};
    pub use crate::error::{MediaError, MediaResult};
    pub use crate::kind::MediaKind;
    pub use crate::manifest::{ManifestCodec, MediaFileDescriptor, MediaManifest};
    pub use crate::service::MediaStorageService;
    #[cfg(feature = "s3")]
    pub use crate::store::S3ObjectStore;
    pub use crate::store::{MemoryObjectStore, ObjectStore, ObjectStoreError};
    pub use crate::types::{MediaAsset, MediaUpload};
    pub use crate::variant::{MediaVariant, VARIANT_DEFINITIONS};
}
