//! Drawing face outlines and cutting crops out of the working raster.
//!
//! Annotation mutates the working raster in place. The pipeline draws the
//! outline for a face *before* cropping it, so every crop carries its own red
//! frame plus the frames of earlier faces that overlap it. Later faces have not
//! been drawn yet when an earlier crop is taken.

use crate::region::Rect;
use image::{Rgb, RgbImage, SubImage};
use imageproc::drawing::draw_hollow_rect_mut;

/// Outline color for detected faces.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outline stroke width in pixels, drawn inward from the rectangle edge.
pub const OUTLINE_WIDTH: i32 = 3;

/// Draw an unfilled outline along the inside edge of `rect`.
///
/// `rect` must already be clamped to the raster. Zero-area rectangles draw
/// nothing; rectangles thinner than the stroke get as many rings as fit.
pub fn draw_outline(img: &mut RgbImage, rect: &Rect) {
    for inset in 0..OUTLINE_WIDTH {
        let width = rect.width() - 2 * inset;
        let height = rect.height() - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let ring = imageproc::rect::Rect::at(rect.left + inset, rect.top + inset)
            .of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, ring, OUTLINE_COLOR);
    }
}

/// Borrowed view of the raster inside `rect`.
///
/// No resampling: the view is exactly `rect.width() × rect.height()` pixels
/// when `rect` lies within the raster.
pub fn crop_view<'a>(img: &'a RgbImage, rect: &Rect) -> SubImage<&'a RgbImage> {
    let (x, y, width, height) = rect.to_xywh();
    image::imageops::crop_imm(img, x, y, width, height)
}
