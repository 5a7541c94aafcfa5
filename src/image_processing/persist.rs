use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::CropError;
use crate::utils::sanitize_filename;

/// strftime pattern for the timestamp part of output filenames (day, month,
/// hour, minute, second)
pub const TIMESTAMP_FORMAT: &str = "%d%m%H%M%S";

/// Current local time formatted for output filenames
///
/// Two runs within the same second for the same image produce the same name
/// and the later one overwrites the earlier.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Build `{prefix}{timestamp}_{image_name}`
///
/// Path separators in `image_name` are flattened so nested object keys end
/// up directly in the output directory.
pub fn output_filename(prefix: &str, timestamp: &str, image_name: &str) -> String {
    format!("{}{}_{}", prefix, timestamp, sanitize_filename(image_name))
}

pub fn output_path(temp_path: &Path, prefix: &str, timestamp: &str, image_name: &str) -> PathBuf {
    temp_path.join(output_filename(prefix, timestamp, image_name))
}

/// Encode as baseline JPEG; alpha is dropped
pub fn encode_jpeg(img: &DynamicImage, quality: u8, path: &Path) -> Result<Vec<u8>, CropError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();

    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        .map_err(|source| CropError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(buffer)
}

/// Write every `(path, bytes)` pair, or none of them
///
/// If a write fails, files already written by this call are removed before
/// the error is returned.
pub fn write_outputs(outputs: &[(&Path, &[u8])]) -> Result<(), CropError> {
    for (index, (path, bytes)) in outputs.iter().enumerate() {
        if let Err(e) = std::fs::write(path, bytes) {
            for (written, _) in &outputs[..index] {
                if let Err(remove_err) = std::fs::remove_file(written) {
                    warn!("Failed to remove {}: {}", written.display(), remove_err);
                }
            }
            return Err(e.into());
        }
    }
    Ok(())
}
