use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::crop::PixelRect;
use super::envelope::{to_pixel, BoundingBox, Envelope};

const INSTANCE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const ENVELOPE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CROP_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Outline thickness in pixels, scaled with the image so it stays visible on
/// large photos
fn line_thickness(width: u32, height: u32) -> u32 {
    (width.max(height) / 400).clamp(1, 8)
}

/// Render the source image with every instance box, the envelope and the
/// final crop window outlined
pub fn draw_debug_overlay(
    img: &DynamicImage,
    boxes: &[BoundingBox],
    envelope: &Envelope,
    crop: &PixelRect,
) -> RgbImage {
    let mut canvas = img.to_rgb8();
    let (width, height) = canvas.dimensions();
    let thickness = line_thickness(width, height);

    for bbox in boxes {
        let rect = normalized_rect(
            (bbox.left, bbox.top),
            (bbox.right(), bbox.bottom()),
            width,
            height,
        );
        draw_outline(&mut canvas, &rect, thickness, INSTANCE_COLOR);
    }

    let envelope_rect = normalized_rect(envelope.top_left, envelope.bottom_right, width, height);
    draw_outline(&mut canvas, &envelope_rect, thickness, ENVELOPE_COLOR);
    draw_outline(&mut canvas, crop, thickness, CROP_COLOR);

    canvas
}

fn normalized_rect(top_left: (f64, f64), bottom_right: (f64, f64), width: u32, height: u32) -> PixelRect {
    PixelRect {
        left: to_pixel(top_left.0, width),
        top: to_pixel(top_left.1, height),
        right: to_pixel(bottom_right.0, width),
        bottom: to_pixel(bottom_right.1, height),
    }
}

/// Draw `rect` as nested one-pixel outlines growing inwards
fn draw_outline(canvas: &mut RgbImage, rect: &PixelRect, thickness: u32, color: Rgb<u8>) {
    for inset in 0..thickness as i64 {
        let w = rect.width() - 2 * inset;
        let h = rect.height() - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }

        let outline = Rect::at((rect.left + inset) as i32, (rect.top + inset) as i32)
            .of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, outline, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_thickness() {
        assert_eq!(line_thickness(100, 100), 1);
        assert_eq!(line_thickness(4000, 3000), 8);
        assert_eq!(line_thickness(1200, 800), 3);
    }

    #[test]
    fn test_overlay_draws_crop_outline() {
        let img = DynamicImage::new_rgb8(100, 100);
        let boxes = [BoundingBox::new(0.25, 0.25, 0.25, 0.25)];
        let envelope = Envelope::from_box(&boxes[0]);
        let crop = PixelRect {
            left: 10,
            top: 10,
            right: 90,
            bottom: 90,
        };

        let overlay = draw_debug_overlay(&img, &boxes, &envelope, &crop);

        assert_eq!(overlay.dimensions(), (100, 100));
        assert_eq!(*overlay.get_pixel(10, 50), CROP_COLOR);
        // Instance box and envelope coincide; the envelope is drawn last
        assert_eq!(*overlay.get_pixel(25, 30), ENVELOPE_COLOR);
        assert_eq!(*overlay.get_pixel(50, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_overlay_skips_empty_boxes() {
        let img = DynamicImage::new_rgb8(50, 50);
        let boxes = [BoundingBox::new(0.5, 0.5, 0.0, 0.0)];
        let envelope = Envelope::from_box(&boxes[0]);
        let crop = PixelRect {
            left: 0,
            top: 0,
            right: 50,
            bottom: 50,
        };

        let overlay = draw_debug_overlay(&img, &boxes, &envelope, &crop);
        assert_eq!(*overlay.get_pixel(25, 25), Rgb([0, 0, 0]));
    }
}
