//! Data models for the application

mod orientation;
mod video;

pub use orientation::Orientation;
pub use video::{Video, VideoResponse};
