//! Video upload orchestration
//!
//! `VideoUploadService` sequences one upload through
//! `Authorizing → Receiving → Classifying → Transcoding → KeyDerivation → Uploading →
//! Persisting → Done`. Every failure is reported as an [`UploadFailure`] naming the stage it
//! happened in. Staged and remuxed files are scoped temp paths, so they are removed on every
//! exit branch.

mod receive;
mod service;
mod stage;

pub use receive::{stage_upload, StagedUpload};
pub use service::{UploadRequest, VideoUploadService};
pub use stage::{UploadFailure, UploadStage};
