//! S3-compatible object store backend
//!
//! Works against AWS S3 and S3-compatible services (MinIO, Ceph, R2, ...).
//! Requires the `s3` feature, which is enabled by default.
//!
//! # Examples
//!
//! ```rust,no_run
//! use media_vault::config::StorageSettings;
//! use media_vault::store::S3ObjectStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = StorageSettings {
//!     bucket: "media".to_string(),
//!     endpoint: Some("http://localhost:9000".to_string()),
//!     path_style_access: true,
//!     ..StorageSettings::default()
//! };
//!
//! let store = S3ObjectStore::from_settings(&settings).await?;
//! # Ok(())
//! # }
//! ```

use super::traits::{ObjectStore, ObjectStoreError};
use crate::config::StorageSettings;
use crate::error::MediaResult;
use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

const NO_SUCH_KEY: &str = "NoSuchKey";
const NOT_FOUND_STATUS: u16 = 404;

/// Object store backed by an S3 bucket
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    default_base_url: String,
}

impl S3ObjectStore {
    /// Creates a store from an existing client
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>, default_base_url: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            default_base_url: default_base_url.into(),
        }
    }

    /// Builds a client from storage settings
    ///
    /// Static credentials are used when both keys are configured; otherwise
    /// the AWS SDK default credential chain applies (environment variables,
    /// `~/.aws/credentials`, instance profile).
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`](crate::error::MediaError::Validation) if
    /// the settings are incomplete.
    pub async fn from_settings(settings: &StorageSettings) -> MediaResult<Self> {
        settings.validate()?;

        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.path_style_access);

        if let Some(endpoint) = settings.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            builder = builder.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "media-vault-config",
            ));
        }

        let client = Client::from_conf(builder.build());
        tracing::info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint,
            path_style = settings.path_style_access,
            "Created S3 object store"
        );

        Ok(Self::new(client, settings.bucket.clone(), default_base_url(settings)))
    }
}

/// Backend URL objects are served from when no public base URL is set
///
/// Custom endpoints use `{endpoint}/{bucket}` with path-style access and
/// `{scheme}://{bucket}.{host}` without it. AWS endpoints use the regional
/// path-style or virtual-hosted form.
#[must_use]
pub fn default_base_url(settings: &StorageSettings) -> String {
    let endpoint = settings
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    match endpoint {
        Some(endpoint) if settings.path_style_access => {
            format!("{}/{}", endpoint.trim_end_matches('/'), settings.bucket)
        }
        Some(endpoint) => {
            let (scheme, host) = endpoint
                .split_once("://")
                .unwrap_or(("https", endpoint));
            format!("{scheme}://{}.{}", settings.bucket, host.trim_end_matches('/'))
        }
        None if settings.path_style_access => {
            format!("https://s3.{}.amazonaws.com/{}", settings.region, settings.bucket)
        }
        None => format!("https://{}.s3.{}.amazonaws.com", settings.bucket, settings.region),
    }
}

fn is_not_found<E>(err: &SdkError<E, HttpResponse>) -> bool
where
    E: ProvideErrorMetadata,
{
    let code = err.as_service_error().and_then(|e| e.code());
    matches!(code, Some(NO_SUCH_KEY | "NotFound"))
        || err
            .raw_response()
            .is_some_and(|r| r.status().as_u16() == NOT_FOUND_STATUS)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                ObjectStoreError::backend(format!("put {key}: {}", DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    ObjectStoreError::NotFound(key.to_string())
                } else {
                    ObjectStoreError::backend(format!("get {key}: {}", DisplayErrorContext(&e)))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::backend(format!("read body of {key}: {e}")))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    ObjectStoreError::NotFound(key.to_string())
                } else {
                    ObjectStoreError::backend(format!("delete {key}: {}", DisplayErrorContext(&e)))
                }
            })?;
        Ok(())
    }

    fn default_base_url(&self) -> String {
        self.default_base_url.clone()
    }
}
