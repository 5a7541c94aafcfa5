use serde::{Deserialize, Serialize};

/// Normalized bounding box of one detected object instance
///
/// All fields are fractions of the image dimensions, as returned by the
/// detector (`Left`, `Top`, `Width`, `Height`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Minimal rectangle enclosing every detected box, in normalized coordinates
///
/// Not clamped to `[0, 1]`: if the detector reports boxes slightly outside
/// the image, the envelope follows them and the cropper clamps later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub top_left: (f64, f64),
    pub bottom_right: (f64, f64),
}

impl Envelope {
    /// Envelope of a single box
    pub fn from_box(bbox: &BoundingBox) -> Self {
        Self {
            top_left: (bbox.left, bbox.top),
            bottom_right: (bbox.right(), bbox.bottom()),
        }
    }

    /// Grow the envelope so it also contains `bbox`
    pub fn include(&mut self, bbox: &BoundingBox) {
        self.top_left.0 = self.top_left.0.min(bbox.left);
        self.top_left.1 = self.top_left.1.min(bbox.top);
        self.bottom_right.0 = self.bottom_right.0.max(bbox.right());
        self.bottom_right.1 = self.bottom_right.1.max(bbox.bottom());
    }

    /// Pixel size of the envelope on a `width` x `height` image
    ///
    /// Each corner is truncated to a pixel first, so this matches the
    /// rectangle the cropper starts from.
    pub fn pixel_size(&self, width: u32, height: u32) -> (i64, i64) {
        let left = to_pixel(self.top_left.0, width);
        let top = to_pixel(self.top_left.1, height);
        let right = to_pixel(self.bottom_right.0, width);
        let bottom = to_pixel(self.bottom_right.1, height);
        (right - left, bottom - top)
    }
}

/// Truncating conversion of a normalized coordinate to pixels
pub(crate) fn to_pixel(coord: f64, dimension: u32) -> i64 {
    (coord * dimension as f64) as i64
}

/// Reduce all boxes to their enclosing envelope
///
/// Returns `None` when there are no boxes; callers must report that as
/// "no detections" rather than cropping anything.
pub fn aggregate<'a, I>(boxes: I) -> Option<Envelope>
where
    I: IntoIterator<Item = &'a BoundingBox>,
{
    let mut boxes = boxes.into_iter();
    let mut envelope = Envelope::from_box(boxes.next()?);
    for bbox in boxes {
        envelope.include(bbox);
    }
    Some(envelope)
}
