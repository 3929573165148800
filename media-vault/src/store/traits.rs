//! Object store backend contract

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Failures reported by an object store backend
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// No object exists under the key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Any other backend failure
    #[error("Object store backend error: {0}")]
    Backend(String),
}

impl ObjectStoreError {
    /// Create a backend error from a string message
    #[must_use]
    pub fn backend<T: Into<String>>(msg: T) -> Self {
        Self::Backend(msg.into())
    }
}

/// Key-addressed binary storage
///
/// Implementations must be safe to share between concurrent pipeline calls;
/// the client's connection pool is the only state they share.
///
/// # Examples
///
/// ```rust
/// use media_vault::store::{MemoryObjectStore, ObjectStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryObjectStore::new("uploads");
/// store.put("media/a/original.txt", "text/plain", "hello".into()).await?;
///
/// let data = store.get("media/a/original.txt").await?;
/// assert_eq!(&data[..], b"hello");
///
/// store.delete("media/a/original.txt").await?;
/// assert!(store.delete("media/a/original.txt").await.is_err());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `body` under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Backend`] on any backend failure.
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), ObjectStoreError>;

    /// Reads the object stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NotFound`] if no object exists, or
    /// [`ObjectStoreError::Backend`] on any other failure.
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;

    /// Removes the object stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NotFound`] if the backend can tell the
    /// object did not exist, or [`ObjectStoreError::Backend`] on any other
    /// failure.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Base URL objects are reachable under when no public URL is configured
    fn default_base_url(&self) -> String;
}
