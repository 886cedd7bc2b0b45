//! Artfolio Storage Library
//!
//! This crate provides the object store abstraction used for submitted artwork,
//! with implementations for S3 (and S3-compatible providers) and the local
//! filesystem.
//!
//! # Storage key format
//!
//! Artifact keys are `{assignment_id}/{student_id}/{token}{extension}`, where the
//! token is a freshly generated UUID and the extension comes from the source URL
//! path. Key generation is centralized in the `keys` module so all backends stay
//! consistent. Keys never contain `..` segments or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use artfolio_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{artifact_key, file_extension, ArtifactKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
