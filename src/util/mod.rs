//! Utility modules for artifact-sync.

pub mod content_hash;

pub use content_hash::{HASH_CHUNK_SIZE, hash_file, hash_reader};
