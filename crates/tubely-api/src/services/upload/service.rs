use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncRead;
use tubely_core::{AppError, UploadConfig, Video};
use tubely_db::VideoRepository;
use tubely_processing::{MediaClassifier, ProcessingError, Prober, Remuxer};
use tubely_storage::{
    build_key, extension_for_content_type, KeySource, StorageError, StorageReference, UrlSigner,
    VideoStore,
};
use uuid::Uuid;

use super::receive::stage_upload;
use super::stage::{UploadFailure, UploadStage};
use crate::utils::upload::validate_content_type;

/// One inbound video: the declared content type of the form part and its byte stream.
pub struct UploadRequest<R> {
    pub content_type: Option<String>,
    pub body: R,
}

/// Sequences an upload from an authorized caller to a persisted storage reference.
pub struct VideoUploadService {
    config: UploadConfig,
    videos: Arc<dyn VideoRepository>,
    store: Arc<dyn VideoStore>,
    classifier: MediaClassifier,
    remuxer: Arc<dyn Remuxer>,
    signer: UrlSigner,
}

impl VideoUploadService {
    pub fn new(
        config: UploadConfig,
        videos: Arc<dyn VideoRepository>,
        store: Arc<dyn VideoStore>,
        prober: Arc<dyn Prober>,
        remuxer: Arc<dyn Remuxer>,
    ) -> Self {
        if config.bucket != store.bucket() {
            tracing::warn!(
                configured = %config.bucket,
                store = %store.bucket(),
                "Upload bucket differs from the storage backend bucket; references will not be signable"
            );
        }

        let signer = UrlSigner::new(store.clone(), config.signed_url_ttl);
        Self {
            config,
            videos,
            store,
            classifier: MediaClassifier::new(prober),
            remuxer,
            signer,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Load the target video and check that `caller_id` owns it.
    pub async fn authorize(&self, caller_id: Uuid, video_id: Uuid) -> Result<Video, UploadFailure> {
        enter(UploadStage::Authorizing, video_id);

        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadFailure::at(UploadStage::Authorizing))?
            .ok_or_else(|| {
                UploadFailure::new(
                    UploadStage::Authorizing,
                    AppError::NotFound(format!("Video {} not found", video_id)),
                )
            })?;

        if !video.is_owned_by(caller_id) {
            return Err(UploadFailure::new(
                UploadStage::Authorizing,
                AppError::Forbidden("You do not own this video".to_string()),
            ));
        }

        Ok(video)
    }

    /// Authorize, then ingest. Returns the updated record holding the raw storage reference.
    pub async fn upload<R>(
        &self,
        caller_id: Uuid,
        video_id: Uuid,
        request: UploadRequest<R>,
    ) -> Result<Video, UploadFailure>
    where
        R: AsyncRead + Send,
    {
        let video = self.authorize(caller_id, video_id).await?;
        self.ingest(video, request).await
    }

    /// Run an already authorized video through receive, classify, remux, upload and persist.
    ///
    /// The staged body and the remuxed file are dropped (and deleted) on every return path.
    /// A persist failure leaves the uploaded object in the store without a reference.
    pub async fn ingest<R>(
        &self,
        mut video: Video,
        request: UploadRequest<R>,
    ) -> Result<Video, UploadFailure>
    where
        R: AsyncRead + Send,
    {
        let started = Instant::now();
        let video_id = video.id;

        enter(UploadStage::Receiving, video_id);
        let content_type = validate_content_type(
            request.content_type.as_deref(),
            &self.config.accepted_content_type,
        )
        .map_err(UploadFailure::at(UploadStage::Receiving))?;
        let staged = stage_upload(
            request.body,
            self.config.max_upload_bytes,
            &extension_for_content_type(&content_type),
            self.config.temp_dir.as_deref(),
        )
        .await
        .map_err(UploadFailure::at(UploadStage::Receiving))?;

        enter(UploadStage::Classifying, video_id);
        let orientation = self
            .classifier
            .classify(staged.path())
            .await
            .map_err(|e| {
                UploadFailure::new(UploadStage::Classifying, AppError::Probe(e.to_string()))
            })?;

        enter(UploadStage::Transcoding, video_id);
        let processed = self
            .remuxer
            .remux(staged.path())
            .await
            .map_err(|e| UploadFailure::new(UploadStage::Transcoding, remux_error(e)))?;

        enter(UploadStage::KeyDerivation, video_id);
        let key = build_key(KeySource::Random, orientation, &content_type);

        enter(UploadStage::Uploading, video_id);
        let uploaded_bytes = self
            .store
            .put_file(&key, processed.path(), &content_type)
            .await
            .map_err(|e| {
                UploadFailure::new(UploadStage::Uploading, AppError::Upload(e.to_string()))
            })?;

        drop(processed);
        drop(staged);

        enter(UploadStage::Persisting, video_id);
        let reference = StorageReference::new(&self.config.bucket, &key);
        video.video_url = Some(reference.to_string());
        let updated = self.videos.update_video(&video).await.map_err(|e| {
            tracing::error!(
                video_id = %video_id,
                reference = %reference,
                "Uploaded object is not referenced by any video"
            );
            UploadFailure::new(UploadStage::Persisting, AppError::Persist(e.to_string()))
        })?;

        enter(UploadStage::Done, video_id);
        tracing::info!(
            video_id = %video_id,
            orientation = %orientation,
            key = %key,
            size = uploaded_bytes,
            duration_ms = started.elapsed().as_millis() as u64,
            "Video uploaded"
        );

        Ok(updated)
    }

    /// Replace the stored reference on `video` with a freshly signed retrieval URL.
    /// Videos without a reference are returned unchanged.
    pub async fn sign_video(&self, mut video: Video) -> Result<Video, AppError> {
        if let Some(raw) = video.video_url.take() {
            let url = self.signer.sign_stored(&raw).await.map_err(signing_error)?;
            video.video_url = Some(url);
        }
        Ok(video)
    }
}

fn enter(stage: UploadStage, video_id: Uuid) {
    tracing::debug!(stage = %stage, video_id = %video_id, "Upload stage");
}

fn remux_error(err: ProcessingError) -> AppError {
    match err {
        ProcessingError::EmptyOutput(path) => AppError::EmptyOutput(path.display().to_string()),
        other => AppError::Transcode(other.to_string()),
    }
}

fn signing_error(err: StorageError) -> AppError {
    match err {
        StorageError::MalformedReference(msg) => AppError::MalformedReference(msg),
        other => AppError::Signing(other.to_string()),
    }
}
