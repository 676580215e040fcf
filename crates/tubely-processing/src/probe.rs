//! Stream probing via ffprobe

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::command::{run_with_timeout, validate_executable, validate_path};
use crate::error::{ProcessingError, ProcessingResult};

/// Frame dimensions of the first stream in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Reports the dimensions of a video file.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, path: &Path) -> ProcessingResult<Dimensions>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// Only the first stream is inspected. A stream without dimensions (audio first, for
/// example) reports zero width and height rather than failing.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<Dimensions> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| ProcessingError::Probe("No streams found in file".to_string()))?;

    Ok(Dimensions {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> ProcessingResult<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<Dimensions> {
        let start = Instant::now();
        validate_path(&path.to_string_lossy())?;

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = match run_with_timeout(command, "ffprobe", self.timeout).await {
            Ok(output) => output,
            Err(ProcessingError::Timeout { .. }) => {
                return Err(ProcessingError::Probe(format!(
                    "ffprobe timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Err(e) => return Err(ProcessingError::Probe(e.to_string())),
        };

        if !output.status.success() {
            return Err(ProcessingError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = dimensions.width,
            height = dimensions.height,
            "Video probe completed"
        );

        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_stream_dimensions() {
        let json = br#"{"streams":[{"index":0,"codec_type":"video","width":1920,"height":1080},{"index":1,"codec_type":"audio"}]}"#;
        let dims = parse_probe_output(json).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_parse_no_streams_is_probe_error() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[]}"#),
            Err(ProcessingError::Probe(_))
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(ProcessingError::Probe(_))
        ));
    }

    #[test]
    fn test_parse_invalid_json_is_probe_error() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(ProcessingError::Probe(_))
        ));
    }

    #[test]
    fn test_parse_stream_without_dimensions() {
        let dims = parse_probe_output(br#"{"streams":[{"codec_type":"audio"}]}"#).unwrap();
        assert_eq!(dims.width, 0);
        assert_eq!(dims.height, 0);
    }

    #[test]
    fn test_new_rejects_unsafe_executable() {
        assert!(FfprobeProber::new("ffprobe; rm -rf /", Duration::from_secs(1)).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_runs_executable() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "ffprobe",
            r#"echo '{"streams":[{"width":1080,"height":1920}]}'"#,
        );
        let video = dir.path().join("input.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let prober =
            FfprobeProber::new(script.to_string_lossy(), Duration::from_secs(5)).unwrap();
        let dims = prober.probe(&video).await.unwrap();
        assert_eq!(dims.width, 1080);
        assert_eq!(dims.height, 1920);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_nonzero_exit_is_probe_error() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "ffprobe",
            "echo 'Invalid data found when processing input' >&2; exit 1",
        );
        let video = dir.path().join("input.mp4");
        std::fs::write(&video, b"garbage").unwrap();

        let prober =
            FfprobeProber::new(script.to_string_lossy(), Duration::from_secs(5)).unwrap();
        let err = prober.probe(&video).await.unwrap_err();
        match err {
            ProcessingError::Probe(msg) => assert!(msg.contains("Invalid data")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_timeout_is_probe_error() {
        use crate::command::test_support::write_script;

        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffprobe", "sleep 5");
        let video = dir.path().join("input.mp4");
        std::fs::write(&video, b"garbage").unwrap();

        let prober =
            FfprobeProber::new(script.to_string_lossy(), Duration::from_millis(200)).unwrap();
        assert!(matches!(
            prober.probe(&video).await,
            Err(ProcessingError::Probe(_))
        ));
    }
}
