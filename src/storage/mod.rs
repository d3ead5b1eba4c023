//! Object storage backends.
//!
//! [`ObjectStore`] is the narrow set of bucket operations the sync client
//! needs. [`S3ObjectStore`] talks to S3 or an S3-compatible endpoint;
//! [`MemoryObjectStore`] keeps objects in memory for tests.

mod memory_object_store;
mod object_store;
mod s3_object_store;

pub use memory_object_store::{MemoryObjectStore, PutRecord};
pub use object_store::{ObjectPage, ObjectStore, Result, StorageError, list_all_keys};
pub use s3_object_store::{S3ObjectStore, S3ObjectStoreConfig};
