//! Tubely Media Processing Library
//!
//! Wraps the two external tools the upload pipeline depends on: a stream probe that
//! reports frame dimensions (classified into an [`Orientation`](tubely_core::Orientation))
//! and a stream-copy remux that moves container metadata to the front of the file.
//! Both sit behind single-method traits so the orchestrator never spawns processes itself.

pub mod classifier;
mod command;
pub mod error;
pub mod probe;
pub mod remux;

pub use classifier::{classify_dimensions, AspectRatio, MediaClassifier, ASPECT_TOLERANCE};
pub use error::{ProcessingError, ProcessingResult};
pub use probe::{parse_probe_output, Dimensions, FfprobeProber, Prober};
pub use remux::{processing_path, FfmpegRemuxer, ProcessedFile, Remuxer};
