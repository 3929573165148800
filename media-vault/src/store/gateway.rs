//! Domain-facing wrapper around an [`ObjectStore`]
//!
//! Translates backend failures into [`MediaError::Storage`] and makes delete
//! idempotent: deleting an object that is already gone is logged and
//! ignored.

use super::traits::{ObjectStore, ObjectStoreError};
use crate::error::{MediaError, MediaResult};
use bytes::Bytes;
use std::sync::Arc;

/// Thin put/get/delete facade used by the pipeline
#[derive(Clone)]
pub struct ObjectStoreGateway {
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for ObjectStoreGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreGateway")
            .field("default_base_url", &self.store.default_base_url())
            .finish()
    }
}

impl ObjectStoreGateway {
    /// Wraps a backend
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// The backend's fallback base URL
    #[must_use]
    pub fn default_base_url(&self) -> String {
        self.store.default_base_url()
    }

    /// Uploads `body` under `key`
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] on any backend failure.
    #[tracing::instrument(skip(self, body), fields(size = body.len()))]
    pub async fn put(&self, key: &str, content_type: &str, body: Bytes) -> MediaResult<()> {
        self.store.put(key, content_type, body).await.map_err(|e| {
            tracing::error!(key, error = %e, "Object put failed");
            MediaError::storage_with(format!("failed to put {key}"), e)
        })?;

        tracing::debug!(key, content_type, "Stored object");
        Ok(())
    }

    /// Downloads the object under `key`
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if the object is missing or the backend
    /// fails.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, key: &str) -> MediaResult<Bytes> {
        self.store.get(key).await.map_err(|e| match e {
            ObjectStoreError::NotFound(_) => MediaError::storage_with(format!("object {key} does not exist"), e),
            ObjectStoreError::Backend(_) => {
                tracing::error!(key, error = %e, "Object get failed");
                MediaError::storage_with(format!("failed to get {key}"), e)
            }
        })
    }

    /// Removes the object under `key`
    ///
    /// An already-missing object is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] for any backend failure other than
    /// "not found".
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> MediaResult<()> {
        match self.store.delete(key).await {
            Ok(()) => {
                tracing::debug!(key, "Deleted object");
                Ok(())
            }
            Err(ObjectStoreError::NotFound(_)) => {
                tracing::warn!(key, "Object already absent, skipping delete");
                Ok(())
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Object delete failed");
                Err(MediaError::storage_with(format!("failed to delete {key}"), e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::MockObjectStore;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_put_translates_backend_failure() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _| Err(ObjectStoreError::backend("503 Slow Down")));

        let gateway = ObjectStoreGateway::new(Arc::new(store));
        let err = gateway
            .put("media/x/original.png", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();

        assert!(err.is_storage());
        assert!(err.to_string().contains("media/x/original.png"));
    }

    #[tokio::test]
    async fn test_delete_swallows_not_found() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete()
            .with(eq("gone"))
            .times(1)
            .returning(|key| Err(ObjectStoreError::NotFound(key.to_string())));

        let gateway = ObjectStoreGateway::new(Arc::new(store));
        assert!(gateway.delete("gone").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_surfaces_backend_failure() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete()
            .times(1)
            .returning(|_| Err(ObjectStoreError::backend("access denied")));

        let gateway = ObjectStoreGateway::new(Arc::new(store));
        assert!(gateway.delete("locked").await.unwrap_err().is_storage());
    }

    #[tokio::test]
    async fn test_get_missing_is_storage_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_get()
            .returning(|key| Err(ObjectStoreError::NotFound(key.to_string())));

        let gateway = ObjectStoreGateway::new(Arc::new(store));
        let err = gateway.get("media/x/manifest.json").await.unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("does not exist"));
    }
}
