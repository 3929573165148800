//! In-memory object store
//!
//! Keeps objects in a process-local map. Intended for tests and local
//! development; nothing survives a restart.

use super::traits::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An object held by [`MemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    /// MIME type the object was stored with
    pub content_type: String,

    /// Object bytes
    pub data: Bytes,
}

/// Object store backed by a `BTreeMap`
///
/// Counts successful puts and delete attempts, and can be told to fail puts
/// whose key contains a given fragment.
///
/// # Examples
///
/// ```rust
/// use media_vault::store::MemoryObjectStore;
///
/// let store = MemoryObjectStore::new("uploads").fail_puts_containing("/variants/");
/// assert_eq!(store.len(), 0);
/// assert_eq!(store.put_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_puts_containing: Option<String>,
}

impl MemoryObjectStore {
    /// Creates an empty store for `bucket`
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Makes every put whose key contains `fragment` fail with a backend error
    #[must_use]
    pub fn fail_puts_containing(mut self, fragment: impl Into<String>) -> Self {
        self.fail_puts_containing = Some(fragment.into());
        self
    }

    /// Returns a copy of the object under `key`
    #[must_use]
    pub fn object(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().get(key).cloned()
    }

    /// Returns true if an object exists under `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// All stored keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    /// Keys starting with `prefix`, sorted
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of stored objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Number of successful puts so far
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of delete calls so far, including ones for missing keys
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), ObjectStoreError> {
        if let Some(fragment) = &self.fail_puts_containing {
            if key.contains(fragment.as_str()) {
                return Err(ObjectStoreError::backend(format!("injected put failure for {key}")));
            }
        }

        self.objects.write().insert(
            key.to_string(),
            MemoryObject {
                content_type: content_type.to_string(),
                data: body,
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .read()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    fn default_base_url(&self) -> String {
        format!("memory://{}", self.bucket)
    }
}
