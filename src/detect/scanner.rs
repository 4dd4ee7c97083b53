//! Sliding-window evaluation of a [`HaarCascade`] over an image pyramid.
//!
//! For each pyramid level the grayscale image is shrunk by the current scale
//! factor so the cascade always runs at its native window size. Rectangle
//! sums come from integral images; each window is normalized by the standard
//! deviation of its interior before the weak classifiers run.
//!
//! Window placement differs slightly from OpenCV's `detectMultiScale`, which
//! stops once a level is no larger than the window and never places a window
//! flush against the right or bottom edge. Here a level exactly the window
//! size is still scanned and the last window may touch either edge, so
//! images only a window wide or tall can still produce detections.

use super::cascade::{Feature, HaarCascade, WeakClassifier};
use super::grouping::{GROUP_EPS, group_rectangles};
use super::{DetectError, DetectionParams, FaceDetector};
use crate::region::Rect;
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};
use tracing::{debug, trace};

/// Summed-area tables of pixel values and squared pixel values.
///
/// Both tables have one extra leading row and column of zeros so any
/// rectangle sum is four lookups.
pub(crate) struct IntegralImage {
    stride: usize,
    sum: Vec<u64>,
    sq_sum: Vec<u64>,
}

impl IntegralImage {
    pub fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sq_sum = vec![0u64; stride * (h + 1)];
        let raw = img.as_raw();

        for y in 0..h {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = raw[y * w + x] as u64;
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + (x + 1);
                sum[idx] = sum[idx - stride] + row;
                sq_sum[idx] = sq_sum[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sq_sum,
        }
    }

    fn lookup(&self, table: &[u64], x: u32, y: u32, w: u32, h: u32) -> u64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        (table[y1 * self.stride + x1] + table[y0 * self.stride + x0])
            - (table[y0 * self.stride + x1] + table[y1 * self.stride + x0])
    }

    pub fn rect_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        self.lookup(&self.sum, x, y, w, h)
    }

    pub fn rect_sq_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        self.lookup(&self.sq_sum, x, y, w, h)
    }
}

impl HaarCascade {
    /// Divisor that normalizes feature values for the window at `(x, y)`.
    ///
    /// Computed over the window shrunk by one pixel on every side; flat
    /// windows get a factor of 1.
    fn variance_norm(&self, ii: &IntegralImage, x: u32, y: u32) -> f64 {
        let (w, h) = (self.window_width - 2, self.window_height - 2);
        let area = (w * h) as f64;
        let sum = ii.rect_sum(x + 1, y + 1, w, h) as f64;
        let sq = ii.rect_sq_sum(x + 1, y + 1, w, h) as f64;
        let nf = area * sq - sum * sum;
        if nf > 0.0 { nf.sqrt() } else { 1.0 }
    }

    fn feature_value(feature: &Feature, ii: &IntegralImage, x: u32, y: u32) -> f64 {
        feature
            .rects
            .iter()
            .map(|r| r.weight * ii.rect_sum(x + r.x, y + r.y, r.width, r.height) as f64)
            .sum()
    }

    fn tree_output(
        &self,
        tree: &WeakClassifier,
        ii: &IntegralImage,
        x: u32,
        y: u32,
        norm: f64,
    ) -> f64 {
        let mut idx: i32 = 0;
        loop {
            let node = &tree.nodes[idx as usize];
            let value = Self::feature_value(&self.features[node.feature], ii, x, y) / norm;
            idx = if value < node.threshold {
                node.left
            } else {
                node.right
            };
            if idx <= 0 {
                return tree.leaves[idx.unsigned_abs() as usize];
            }
        }
    }

    /// Run every stage on the window at `(x, y)`; true if all stages pass.
    pub(crate) fn accepts_window(&self, ii: &IntegralImage, x: u32, y: u32) -> bool {
        let norm = self.variance_norm(ii, x, y);
        self.stages.iter().all(|stage| {
            let total: f64 = stage
                .classifiers
                .iter()
                .map(|tree| self.tree_output(tree, ii, x, y, norm))
                .sum();
            total >= stage.threshold
        })
    }

    /// Raw (ungrouped) hits over the whole pyramid, in source coordinates.
    ///
    /// `params` must have passed [`DetectionParams::validate`].
    pub(crate) fn scan(&self, gray: &GrayImage, params: &DetectionParams) -> Vec<Rect> {
        let (img_w, img_h) = gray.dimensions();
        let (win_w, win_h) = self.window_size();
        let mut hits = Vec::new();
        let mut factor = 1.0f64;

        loop {
            let scaled_win_w = (win_w as f64 * factor).round() as u32;
            let scaled_win_h = (win_h as f64 * factor).round() as u32;
            if scaled_win_w > img_w || scaled_win_h > img_h {
                break;
            }
            let level_w = (img_w as f64 / factor).round() as u32;
            let level_h = (img_h as f64 / factor).round() as u32;
            if level_w < win_w || level_h < win_h {
                break;
            }

            if scaled_win_w >= params.min_face_size && scaled_win_h >= params.min_face_size {
                let resized;
                let level = if (level_w, level_h) == (img_w, img_h) {
                    gray
                } else {
                    resized =
                        image::imageops::resize(gray, level_w, level_h, FilterType::Triangle);
                    &resized
                };
                let ii = IntegralImage::new(level);
                let step = if factor > 2.0 { 1 } else { 2 };
                let before = hits.len();

                for y in (0..=level_h - win_h).step_by(step) {
                    for x in (0..=level_w - win_w).step_by(step) {
                        if self.accepts_window(&ii, x, y) {
                            hits.push(Rect::from_xywh(
                                (x as f64 * factor).round() as i32,
                                (y as f64 * factor).round() as i32,
                                scaled_win_w as i32,
                                scaled_win_h as i32,
                            ));
                        }
                    }
                }
                trace!(
                    factor,
                    level_w,
                    level_h,
                    hits = hits.len() - before,
                    "pyramid level"
                );
            }

            factor *= params.scale_factor;
        }
        hits
    }
}

/// [`FaceDetector`] backed by a Haar cascade.
pub struct CascadeDetector {
    cascade: HaarCascade,
    params: DetectionParams,
}

impl CascadeDetector {
    pub fn new(cascade: HaarCascade, params: DetectionParams) -> Self {
        Self { cascade, params }
    }
}

impl FaceDetector for CascadeDetector {
    fn detect(&self, img: &RgbImage) -> Result<Vec<Rect>, DetectError> {
        self.params.validate()?;
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(DetectError::EmptyImage);
        }

        let gray = image::imageops::grayscale(img);
        let hits = self.cascade.scan(&gray, &self.params);
        let raw = hits.len();
        let faces = group_rectangles(hits, self.params.min_neighbors, GROUP_EPS);
        debug!(raw_hits = raw, faces = faces.len(), "cascade scan finished");
        Ok(faces)
    }
}
