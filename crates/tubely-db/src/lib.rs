//! Database repositories for data access layer
//!
//! The upload pipeline needs exactly two operations on a video record: load it by id
//! and write it back. They are expressed by the [`VideoRepository`] trait so the HTTP
//! layer can be exercised against an in-memory implementation.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};
