//! Fast-start remuxing via ffmpeg

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::process::Command;

use crate::command::{run_with_timeout, validate_executable, validate_path};
use crate::error::{ProcessingError, ProcessingResult};

/// Sibling path remux output is written to: `<input>.processing`.
pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".processing");
    PathBuf::from(name)
}

/// A remuxed file on disk. The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct ProcessedFile {
    path: TempPath,
    size: u64,
}

impl ProcessedFile {
    /// Take ownership of a file produced by a remux, rejecting it if it is empty.
    ///
    /// The file is removed on every error path as well.
    pub fn from_output(path: impl Into<PathBuf>) -> ProcessingResult<Self> {
        let path = TempPath::try_from_path(path)?;
        let size = std::fs::metadata(&path)?.len();
        if size == 0 {
            return Err(ProcessingError::EmptyOutput(path.to_path_buf()));
        }
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Rewrites a container so playback can begin before the whole file is downloaded.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Remux `input` into a new sibling file. The input is left untouched.
    async fn remux(&self, input: &Path) -> ProcessingResult<ProcessedFile>;
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> ProcessingResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_executable(&ffmpeg_path)?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path) -> ProcessingResult<ProcessedFile> {
        let start = Instant::now();
        validate_path(&input.to_string_lossy())?;

        let output_path = processing_path(input);
        // Removes partial output if ffmpeg fails or times out.
        let guard = TempPath::try_from_path(&output_path)?;

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-v", "error", "-y", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path);

        let output = match run_with_timeout(command, "ffmpeg", self.timeout).await {
            Ok(output) => output,
            Err(ProcessingError::Timeout { .. }) => {
                return Err(ProcessingError::Transcode(format!(
                    "ffmpeg timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Err(e) => return Err(ProcessingError::Transcode(e.to_string())),
        };

        if !output.status.success() {
            return Err(ProcessingError::Transcode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let size = match tokio::fs::metadata(&output_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                return Err(ProcessingError::Transcode(format!(
                    "ffmpeg reported success but produced no output: {}",
                    e
                )))
            }
        };
        if size == 0 {
            return Err(ProcessingError::EmptyOutput(output_path));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            size_bytes = size,
            "Fast-start remux completed"
        );

        Ok(ProcessedFile { path: guard, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_path_is_sibling() {
        let input = Path::new("/tmp/tubely-upload-abc.mp4");
        assert_eq!(
            processing_path(input),
            PathBuf::from("/tmp/tubely-upload-abc.mp4.processing")
        );
    }

    #[test]
    fn test_processed_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.processing");
        std::fs::write(&path, b"moov").unwrap();

        let processed = ProcessedFile::from_output(&path).unwrap();
        assert_eq!(processed.len(), 4);
        assert!(path.exists());

        drop(processed);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_output_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.processing");
        std::fs::write(&path, b"").unwrap();

        let result = ProcessedFile::from_output(&path);
        assert!(matches!(result, Err(ProcessingError::EmptyOutput(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_output_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.processing");

        let result = ProcessedFile::from_output(&path);
        assert!(matches!(result, Err(ProcessingError::Io(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_remux_writes_sibling_and_keeps_input() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        // Copy the input (argument after -i) to the output (last argument).
        let script = write_script(
            dir.path(),
            "ffmpeg",
            r#"while [ "$1" != "-i" ]; do shift; done; in="$2"; for last; do :; done; cp "$in" "$last""#,
        );
        let input = dir.path().join("input.mp4");
        std::fs::write(&input, b"ftypisom....moov....mdat").unwrap();

        let remuxer = FfmpegRemuxer::new(script.to_string_lossy(), Duration::from_secs(5)).unwrap();
        let processed = remuxer.remux(&input).await.unwrap();

        assert_eq!(processed.path(), processing_path(&input));
        assert_eq!(processed.len(), 24);
        assert!(input.exists());

        let output = processed.path().to_path_buf();
        drop(processed);
        assert!(!output.exists());
        assert!(input.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_remux_empty_output_is_error() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffmpeg", r#"for last; do :; done; : > "$last""#);
        let input = dir.path().join("input.mp4");
        std::fs::write(&input, b"data").unwrap();

        let remuxer = FfmpegRemuxer::new(script.to_string_lossy(), Duration::from_secs(5)).unwrap();
        let result = remuxer.remux(&input).await;

        assert!(matches!(result, Err(ProcessingError::EmptyOutput(_))));
        assert!(!processing_path(&input).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_remux_failure_cleans_partial_output() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "ffmpeg",
            r#"for last; do :; done; echo partial > "$last"; echo 'moov atom not found' >&2; exit 1"#,
        );
        let input = dir.path().join("input.mp4");
        std::fs::write(&input, b"data").unwrap();

        let remuxer = FfmpegRemuxer::new(script.to_string_lossy(), Duration::from_secs(5)).unwrap();
        let err = remuxer.remux(&input).await.unwrap_err();

        match err {
            ProcessingError::Transcode(msg) => assert!(msg.contains("moov atom not found")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!processing_path(&input).exists());
    }

    #[tokio::test]
    async fn test_remux_missing_binary_is_transcode_error() {
        let remuxer =
            FfmpegRemuxer::new("/nonexistent/ffmpeg", Duration::from_secs(5)).unwrap();
        let result = remuxer.remux(Path::new("/tmp/tubely-missing-input.mp4")).await;
        assert!(matches!(result, Err(ProcessingError::Transcode(_))));
    }
}
