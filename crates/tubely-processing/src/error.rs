use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Remux failed: {0}")]
    Transcode(String),

    #[error("Remux produced an empty file: {}", .0.display())]
    EmptyOutput(PathBuf),

    #[error("{program} did not finish within {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
