use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tubely_core::{AppError, Video};
use tubely_db::VideoRepository;
use tubely_processing::{
    processing_path, Dimensions, ProcessedFile, ProcessingError, ProcessingResult, Prober,
    Remuxer,
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    /// Make every subsequent `update_video` fail as if the database went away.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection refused".to_string()));
        }
        let mut videos = self.videos.lock().unwrap();
        let existing = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;
        *existing = video.clone();
        Ok(video.clone())
    }
}

/// Reports fixed dimensions, or fails like ffprobe on a file with no streams.
pub struct FakeProber {
    dimensions: Option<Dimensions>,
}

impl FakeProber {
    pub fn new(dimensions: Option<Dimensions>) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, _path: &Path) -> ProcessingResult<Dimensions> {
        self.dimensions
            .ok_or_else(|| ProcessingError::Probe("no video streams found".to_string()))
    }
}

/// Copies the input to its `.processing` sibling.
pub struct CopyRemuxer;

#[async_trait]
impl Remuxer for CopyRemuxer {
    async fn remux(&self, input: &Path) -> ProcessingResult<ProcessedFile> {
        let output = processing_path(input);
        tokio::fs::copy(input, &output).await?;
        ProcessedFile::from_output(output)
    }
}
