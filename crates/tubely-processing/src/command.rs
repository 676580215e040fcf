//! Deadline-bounded subprocess execution shared by the prober and the remuxer.

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::error::ProcessingError;

/// Reject paths carrying shell metacharacters or parent-directory segments.
pub(crate) fn validate_path(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProcessingError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Validate a configured executable (`ffprobe`, `/usr/bin/ffmpeg`, ...).
pub(crate) fn validate_executable(path: &str) -> Result<(), ProcessingError> {
    validate_path(path)?;

    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(ProcessingError::InvalidPath(format!(
            "Executable path contains unsafe characters: {}",
            path
        )));
    }

    Ok(())
}

/// Run `command` to completion, killing it if it outlives `limit`.
pub(crate) async fn run_with_timeout(
    mut command: Command,
    program: &str,
    limit: Duration,
) -> Result<Output, ProcessingError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessingError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(
                program = program,
                timeout_secs = limit.as_secs(),
                "External process timed out and was killed"
            );
            Err(ProcessingError::Timeout {
                program: program.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_rejects_metacharacters() {
        assert!(validate_path("/tmp/video.mp4").is_ok());
        assert!(validate_path("/tmp/video.mp4; rm -rf /").is_err());
        assert!(validate_path("/tmp/$(whoami).mp4").is_err());
        assert!(validate_path("/tmp/../etc/passwd").is_err());
    }

    #[test]
    fn test_validate_executable() {
        assert!(validate_executable("ffprobe").is_ok());
        assert!(validate_executable("/usr/local/bin/ffmpeg").is_ok());
        assert!(validate_executable("").is_err());
        assert!(validate_executable("ffmpeg --help").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_timeout_kills_slow_process() {
        let dir = tempfile::tempdir().unwrap();
        let script = test_support::write_script(dir.path(), "slow", "sleep 5");

        let started = std::time::Instant::now();
        let result =
            run_with_timeout(Command::new(&script), "slow", Duration::from_millis(200)).await;

        assert!(matches!(result, Err(ProcessingError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_run_with_timeout_reports_missing_binary() {
        let result = run_with_timeout(
            Command::new("/nonexistent/tubely-missing-tool"),
            "tubely-missing-tool",
            Duration::from_secs(5),
        )
        .await;

        assert!(matches!(result, Err(ProcessingError::Spawn { .. })));
    }
}
