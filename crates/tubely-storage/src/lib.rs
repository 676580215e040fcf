//! Tubely Storage Library
//!
//! Object storage for processed videos: the [`VideoStore`] trait with S3 and local
//! filesystem backends, the storage key builder, the persisted `"bucket,key"` reference
//! format, and the signer that turns a reference into a time-limited retrieval URL.
//!
//! # Storage key format
//!
//! `{orientation}/{base}{ext}`, e.g. `landscape/3q2-Zx...Qk.mp4`. Keys must not contain
//! `..` or a leading `/`. Key generation is centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod reference;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signer;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{build_key, extension_for_content_type, KeySource};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reference::StorageReference;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signer::UrlSigner;
pub use traits::{StorageError, StorageResult, VideoStore};
pub use tubely_core::StorageBackend;
