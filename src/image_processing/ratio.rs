use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::CropError;

/// Target width:height ratio for the crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> Result<Self, CropError> {
        if width == 0 || height == 0 {
            return Err(CropError::InvalidRatio(format!(
                "{}:{} (both components must be greater than 0)",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            width: 3,
            height: 2,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = CropError;

    /// Parse `W:H` (or `WxH`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(|c| c == ':' || c == 'x').collect();
        if parts.len() != 2 {
            return Err(CropError::InvalidRatio(format!(
                "'{}'. Use WIDTH:HEIGHT (e.g., 3:2)",
                s
            )));
        }

        let width = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| CropError::InvalidRatio(format!("invalid width '{}'", parts[0])))?;
        let height = parts[1]
            .trim()
            .parse::<u32>()
            .map_err(|_| CropError::InvalidRatio(format!("invalid height '{}'", parts[1])))?;

        Self::new(width, height)
    }
}

/// Symmetric padding, in pixels, added to each side of one axis
///
/// At most one component is non-zero. Values can be fractional, and negative
/// when the target extent is smaller than the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Shift {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Compute the padding that moves an envelope of `width` x `height` pixels
/// towards `ratio`
///
/// The short axis is chosen by comparing `width` and `height` directly, and
/// the target extent is always `floor(long / ratio.width * ratio.height)`
/// whichever axis is short. For a tall envelope this yields a 2:3 box under
/// a 3:2 ratio, so the result only approximates `ratio`.
pub fn correct(width: i64, height: i64, ratio: AspectRatio) -> Shift {
    let rw = ratio.width as f64;
    let rh = ratio.height as f64;

    let mut shift = Shift::default();
    if width < height {
        let target_width = (height as f64 / rw * rh).floor();
        shift.horizontal = (target_width - width as f64) / 2.0;
    } else if width > height {
        let target_height = (width as f64 / rw * rh).floor();
        shift.vertical = (target_height - height as f64) / 2.0;
    }

    shift
}
