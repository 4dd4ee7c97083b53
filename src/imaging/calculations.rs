//! Pure calculation functions for working-raster dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of an image scaled to fit inside a target box.
///
/// The aspect ratio is preserved and images already inside the box keep their
/// size; nothing is ever enlarged. Neither output dimension drops below 1 for
/// non-zero input.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Bounding box (width, height)
///
/// # Examples
/// ```
/// # use facecrop::imaging::fit_within;
/// // 4:3 landscape into a 1024 square → 1024x768
/// assert_eq!(fit_within((2048, 1536), (1024, 1024)), (1024, 768));
///
/// // Already small enough → unchanged
/// assert_eq!(fit_within((800, 600), (1024, 1024)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if src_w == 0 || src_h == 0 || (src_w <= tgt_w && src_h <= tgt_h) {
        return source;
    }

    let ratio = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, tgt_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, tgt_h.max(1));
    (w, h)
}
