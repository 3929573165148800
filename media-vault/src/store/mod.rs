//! Object store backends and the gateway the pipeline talks to
//!
//! - [`ObjectStore`]: the backend contract (put/get/delete by key, with a
//!   distinguishable "not found")
//! - [`S3ObjectStore`]: AWS S3 and S3-compatible services (`s3` feature)
//! - [`MemoryObjectStore`]: process-local backend for tests and development
//! - [`ObjectStoreGateway`]: maps backend failures onto the pipeline's
//!   error taxonomy

mod gateway;
mod memory;
#[cfg(feature = "s3")]
mod s3;
mod traits;

pub use gateway::ObjectStoreGateway;
pub use memory::{MemoryObject, MemoryObjectStore};
#[cfg(feature = "s3")]
pub use s3::{default_base_url, S3ObjectStore};
pub use traits::{ObjectStore, ObjectStoreError};

#[cfg(test)]
pub(crate) use traits::MockObjectStore;
