//! Aspect-ratio classification

use std::path::Path;
use std::sync::Arc;

use tubely_core::Orientation;

use crate::error::ProcessingResult;
use crate::probe::Prober;

/// Absolute tolerance when comparing a frame ratio against a known aspect ratio.
pub const ASPECT_TOLERANCE: f64 = 0.1;

/// Known aspect ratios, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 16:9
    Widescreen,
    /// 4:3
    Standard,
    /// 9:16
    Vertical,
    Other,
}

const CHECK_ORDER: [(AspectRatio, f64); 3] = [
    (AspectRatio::Widescreen, 16.0 / 9.0),
    (AspectRatio::Standard, 4.0 / 3.0),
    (AspectRatio::Vertical, 9.0 / 16.0),
];

impl AspectRatio {
    pub fn orientation(self) -> Orientation {
        match self {
            AspectRatio::Widescreen => Orientation::Landscape,
            AspectRatio::Vertical => Orientation::Portrait,
            AspectRatio::Standard | AspectRatio::Other => Orientation::Other,
        }
    }
}

/// Bucket `width / height`. The first ratio within tolerance wins; zero height is `Other`.
pub fn classify_dimensions(width: u32, height: u32) -> AspectRatio {
    if height == 0 {
        return AspectRatio::Other;
    }

    let ratio = f64::from(width) / f64::from(height);
    CHECK_ORDER
        .iter()
        .find(|(_, target)| (ratio - target).abs() < ASPECT_TOLERANCE)
        .map(|(aspect, _)| *aspect)
        .unwrap_or(AspectRatio::Other)
}

/// Probes a file and maps its frame to an [`Orientation`].
#[derive(Clone)]
pub struct MediaClassifier {
    prober: Arc<dyn Prober>,
}

impl MediaClassifier {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    pub async fn classify(&self, path: &Path) -> ProcessingResult<Orientation> {
        let dims = self.prober.probe(path).await?;
        let aspect = classify_dimensions(dims.width, dims.height);
        let orientation = aspect.orientation();

        tracing::debug!(
            width = dims.width,
            height = dims.height,
            aspect = ?aspect,
            orientation = %orientation,
            "Classified video"
        );

        Ok(orientation)
    }
}
