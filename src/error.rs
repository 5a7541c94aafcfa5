use std::path::PathBuf;

use thiserror::Error;

use crate::image_processing::crop::PixelRect;

/// Errors produced while detecting, planning, cropping or saving an image
#[derive(Debug, Error)]
pub enum CropError {
    /// The detector returned no object instances, so there is nothing to crop around
    #[error("no detections found")]
    NoDetections,

    /// The clamped crop window has no area
    #[error("degenerate crop rectangle: {rect}")]
    DegenerateCrop { rect: PixelRect },

    #[error("invalid aspect ratio: {0}")]
    InvalidRatio(String),

    #[error("detection failed: {0}")]
    Detection(String),

    #[error("failed to fetch s3://{bucket}/{key}: {source}")]
    Storage {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CropError> = std::result::Result<T, E>;
