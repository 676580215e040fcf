use std::fmt;
use tubely_core::AppError;

/// Stages of a single upload, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Authorizing,
    Receiving,
    Classifying,
    Transcoding,
    KeyDerivation,
    Uploading,
    Persisting,
    Done,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Authorizing => "authorizing",
            UploadStage::Receiving => "receiving",
            UploadStage::Classifying => "classifying",
            UploadStage::Transcoding => "transcoding",
            UploadStage::KeyDerivation => "key_derivation",
            UploadStage::Uploading => "uploading",
            UploadStage::Persisting => "persisting",
            UploadStage::Done => "done",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal `Failed(stage, cause)` state of an upload.
#[derive(Debug, thiserror::Error)]
#[error("upload failed while {stage}: {cause}")]
pub struct UploadFailure {
    pub stage: UploadStage,
    #[source]
    pub cause: AppError,
}

impl UploadFailure {
    pub fn new(stage: UploadStage, cause: AppError) -> Self {
        Self { stage, cause }
    }

    /// Closure for `map_err` that tags an error with `stage`.
    pub fn at<E: Into<AppError>>(stage: UploadStage) -> impl FnOnce(E) -> Self {
        move |e| Self::new(stage, e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_names_stage() {
        let failure = UploadFailure::new(UploadStage::Classifying, AppError::Probe("exit 1".into()));
        assert_eq!(
            failure.to_string(),
            "upload failed while classifying: Probe error: exit 1"
        );
    }

    #[test]
    fn test_at_tags_stage() {
        let result: Result<(), AppError> = Err(AppError::Forbidden("nope".into()));
        let failure = result.map_err(UploadFailure::at(UploadStage::Authorizing)).unwrap_err();
        assert_eq!(failure.stage, UploadStage::Authorizing);
        assert!(matches!(failure.cause, AppError::Forbidden(_)));
    }
}
