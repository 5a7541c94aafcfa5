use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::fmt;

use super::envelope::{to_pixel, Envelope};
use super::ratio::Shift;
use crate::error::CropError;

/// Pixel rectangle `[left, right) x [top, bottom)`
///
/// Signed so that a rejected (degenerate) window can still be reported as
/// computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelRect {
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// True if the rectangle lies within a `width` x `height` image
    pub fn fits(&self, width: u32, height: u32) -> bool {
        0 <= self.left
            && self.left <= self.right
            && self.right <= width as i64
            && 0 <= self.top
            && self.top <= self.bottom
            && self.bottom <= height as i64
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{}) {}x{}",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}

/// Compute the crop window for `envelope` padded by `shift` on an image of
/// `image_width` x `image_height`
///
/// The envelope corners are truncated to pixels, widened by the shift on
/// both sides, then clamped: `left`/`top` are clamped to 0 first and
/// `right`/`bottom` are re-derived from the clamped values before being
/// capped at the image edge. Clamping the leading edge therefore slides the
/// window instead of only trimming it. Fractional edges round half to even.
pub fn crop_rect(
    envelope: &Envelope,
    shift: Shift,
    image_width: u32,
    image_height: u32,
) -> Result<PixelRect, CropError> {
    let left = to_pixel(envelope.top_left.0, image_width) as f64;
    let top = to_pixel(envelope.top_left.1, image_height) as f64;
    let right = to_pixel(envelope.bottom_right.0, image_width) as f64;
    let bottom = to_pixel(envelope.bottom_right.1, image_height) as f64;

    let new_width = right - left + shift.horizontal * 2.0;
    let new_height = bottom - top + shift.vertical * 2.0;

    let left = (left - shift.horizontal).max(0.0);
    let right = (left + new_width).min(image_width as f64);
    let top = (top - shift.vertical).max(0.0);
    let bottom = (top + new_height).min(image_height as f64);

    let rect = PixelRect {
        left: left.round_ties_even() as i64,
        top: top.round_ties_even() as i64,
        right: right.round_ties_even() as i64,
        bottom: bottom.round_ties_even() as i64,
    };

    if rect.is_empty() {
        return Err(CropError::DegenerateCrop { rect });
    }

    Ok(rect)
}

/// Extract the sub-image covered by `rect`
pub fn crop_image(img: &DynamicImage, rect: &PixelRect) -> Result<DynamicImage, CropError> {
    let (img_width, img_height) = img.dimensions();

    if rect.is_empty() || !rect.fits(img_width, img_height) {
        return Err(CropError::DegenerateCrop { rect: *rect });
    }

    Ok(img.crop_imm(
        rect.left as u32,
        rect.top as u32,
        rect.width() as u32,
        rect.height() as u32,
    ))
}
