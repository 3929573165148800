//! Error types and error handling
//!
//! The pipeline distinguishes exactly two failure categories:
//!
//! - [`MediaError::Validation`]: the caller supplied input that violates
//!   policy. Recoverable by correcting the input, never retried.
//! - [`MediaError::Storage`]: the object store or the image codec failed.
//!   The whole logical operation may be retried by the caller.

use thiserror::Error;

/// Boxed error used as the underlying cause of a storage failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the media storage pipeline
#[derive(Debug, Error)]
pub enum MediaError {
    /// Caller-supplied input violates policy
    #[error("Validation error: {0}")]
    Validation(String),

    /// Object store or codec failure
    #[error("Storage error: {message}")]
    Storage {
        /// What failed, including the affected key when there is one
        message: String,

        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },
}

/// Result type for media pipeline operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Create a validation error from a message
    #[must_use]
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error without an underlying cause
    #[must_use]
    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping an underlying cause
    #[must_use]
    pub fn storage_with<T, E>(msg: T, source: E) -> Self
    where
        T: Into<String>,
        E: Into<BoxError>,
    {
        Self::Storage {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Returns true for [`MediaError::Validation`]
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true for [`MediaError::Storage`]
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage_with("manifest serialization failed", err)
    }
}
