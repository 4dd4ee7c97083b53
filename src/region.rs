//! Face-region geometry: rectangles, clamping and crop expansion.
//!
//! Every rectangle is expressed in working-raster pixel coordinates with
//! exclusive `right`/`bottom` edges, so `width = right - left`.
//!
//! ## Crop expansion
//!
//! A detected face box is padded asymmetrically before it is drawn and cropped:
//!
//! ```text
//!            padTop = h/2
//!          ┌───────────────┐
//!  padX    │   ┌───────┐   │   padX
//!  = w/2   │   │ face  │   │   = w/2
//!          │   └───────┘   │
//!          │               │  padBottom = h
//!          │  chin / neck  │
//!          └───────────────┘
//! ```
//!
//! The expanded rectangle is then clamped to the raster bounds. The same value
//! feeds both the annotator and the cropper, so the outline and the crop can
//! never disagree.

use serde::Serialize;

/// Axis-aligned rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Build from corner coordinates. Swapped corners are normalized so that
    /// `left <= right` and `top <= bottom` always hold.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Build from an origin and a size, the shape detectors report.
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            x,
            y,
            x.saturating_add(width.max(0)),
            y.saturating_add(height.max(0)),
        )
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Clamp to `[0, width] × [0, height]`.
    ///
    /// Every coordinate is clamped independently, which keeps the ordering
    /// invariant: a rectangle lying entirely outside the bounds collapses to a
    /// zero-area rectangle on the nearest edge. Clamping is idempotent.
    pub fn clamp(&self, bounds: Bounds) -> Rect {
        let w = bounds.width_i32();
        let h = bounds.height_i32();
        Rect {
            left: self.left.clamp(0, w),
            top: self.top.clamp(0, h),
            right: self.right.clamp(0, w),
            bottom: self.bottom.clamp(0, h),
        }
    }

    /// Pad a detected face box for cropping, then clamp to `bounds`.
    ///
    /// Half the face width is added on each side, half the face height above
    /// and a full face height below. Zero-width or zero-height detections get
    /// no padding on that axis.
    pub fn expand_for_crop(&self, bounds: Bounds) -> Rect {
        let pad_x = self.width() / 2;
        let pad_top = self.height() / 2;
        let pad_bottom = self.height();

        Rect {
            left: self.left.saturating_sub(pad_x),
            top: self.top.saturating_sub(pad_top),
            right: self.right.saturating_add(pad_x),
            bottom: self.bottom.saturating_add(pad_bottom),
        }
        .clamp(bounds)
    }

    /// Origin and size as unsigned values, for raster APIs.
    ///
    /// Only meaningful for a rectangle that was clamped to raster bounds.
    pub fn to_xywh(&self) -> (u32, u32, u32, u32) {
        (
            self.left.max(0) as u32,
            self.top.max(0) as u32,
            self.width().max(0) as u32,
            self.height().max(0) as u32,
        )
    }
}

/// Raster dimensions used as the clamping box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn width_i32(&self) -> i32 {
        i32::try_from(self.width).unwrap_or(i32::MAX)
    }

    fn height_i32(&self) -> i32 {
        i32::try_from(self.height).unwrap_or(i32::MAX)
    }
}

impl From<&image::RgbImage> for Bounds {
    fn from(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKING: Bounds = Bounds {
        width: 1024,
        height: 1024,
    };

    #[test]
    fn expand_interior_face_no_clamping() {
        // w=100, h=120 → padX=50, padTop=60, padBottom=120
        let raw = Rect::new(100, 100, 200, 220);
        assert_eq!(raw.expand_for_crop(WORKING), Rect::new(50, 40, 250, 340));
    }

    #[test]
    fn expand_corner_face_clamps_to_zero() {
        let raw = Rect::new(0, 0, 40, 40);
        assert_eq!(raw.expand_for_crop(WORKING), Rect::new(0, 0, 60, 80));
    }

    #[test]
    fn expand_bottom_right_clamps_to_bounds() {
        let raw = Rect::new(950, 900, 1024, 1000);
        let expanded = raw.expand_for_crop(WORKING);
        assert_eq!(expanded.right, 1024);
        assert_eq!(expanded.bottom, 1024);
        assert_eq!(expanded.left, 950 - 37);
        assert_eq!(expanded.top, 900 - 50);
    }

    #[test]
    fn expand_degenerate_detection_is_unchanged() {
        let raw = Rect::new(300, 300, 300, 300);
        assert_eq!(raw.expand_for_crop(WORKING), raw);

        let flat = Rect::new(300, 300, 340, 300);
        assert_eq!(flat.expand_for_crop(WORKING), Rect::new(280, 300, 360, 300));
    }

    #[test]
    fn expand_uses_integer_division() {
        // w=5, h=7 → padX=2, padTop=3, padBottom=7
        let raw = Rect::new(100, 100, 105, 107);
        assert_eq!(raw.expand_for_crop(WORKING), Rect::new(98, 97, 107, 114));
    }

    #[test]
    fn expanded_contains_raw_for_in_bounds_rects() {
        let bounds = Bounds::new(640, 480);
        for left in (0..600).step_by(37) {
            for top in (0..440).step_by(29) {
                for size in [1, 10, 33, 80] {
                    let raw = Rect::from_xywh(left, top, size, size).clamp(bounds);
                    let expanded = raw.expand_for_crop(bounds);
                    assert!(expanded.contains(&raw), "{expanded:?} !⊇ {raw:?}");
                    assert!(expanded.left >= 0 && expanded.top >= 0);
                    assert!(expanded.right <= 640 && expanded.bottom <= 480);
                }
            }
        }
    }

    #[test]
    fn edge_touching_rect_never_goes_negative() {
        let raw = Rect::new(0, 200, 50, 260);
        let expanded = raw.expand_for_crop(WORKING);
        assert_eq!(expanded.left, 0);

        let raw = Rect::new(200, 0, 260, 50);
        let expanded = raw.expand_for_crop(WORKING);
        assert_eq!(expanded.top, 0);
    }

    #[test]
    fn clamp_is_idempotent() {
        let bounds = Bounds::new(320, 240);
        let cases = [
            Rect::new(-50, -10, 100, 100),
            Rect::new(300, 200, 400, 300),
            Rect::new(500, 500, 600, 600),
            Rect::new(10, 10, 20, 20),
        ];
        for r in cases {
            let once = r.clamp(bounds);
            assert_eq!(once.clamp(bounds), once);
        }
    }

    #[test]
    fn clamp_keeps_ordering_for_out_of_bounds_rect() {
        let r = Rect::new(500, 500, 600, 600).clamp(Bounds::new(320, 240));
        assert!(r.left <= r.right);
        assert!(r.top <= r.bottom);
        assert!(r.is_empty());
    }

    #[test]
    fn new_normalizes_swapped_corners() {
        let r = Rect::new(200, 220, 100, 100);
        assert_eq!(r, Rect::new(100, 100, 200, 220));
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 120);
    }

    #[test]
    fn from_xywh_matches_corners() {
        assert_eq!(Rect::from_xywh(10, 20, 30, 40), Rect::new(10, 20, 40, 60));
    }

    #[test]
    fn to_xywh_reports_origin_and_size() {
        assert_eq!(Rect::new(50, 40, 250, 340).to_xywh(), (50, 40, 200, 300));
    }
}
