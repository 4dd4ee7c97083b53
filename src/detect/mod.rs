//! Face detection.
//!
//! The pipeline only sees the [`FaceDetector`] trait: give it the working
//! raster, get back face boxes in the raster's pixel coordinates, in
//! detector order. The production detector is [`CascadeDetector`], a
//! pure-Rust evaluator for OpenCV boosted Haar cascades such as
//! `haarcascade_frontalface_default.xml`.
//!
//! - **cascade**: XML loading and validation ([`HaarCascade`])
//! - **scanner**: integral images, window evaluation, image pyramid
//! - **grouping**: merging overlapping hits into face boxes

mod cascade;
mod grouping;
mod scanner;

pub use cascade::{CascadeError, HaarCascade};
pub use grouping::{GROUP_EPS, group_rectangles};
pub use scanner::CascadeDetector;

use crate::region::Rect;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Cannot run detection on an empty image")]
    EmptyImage,
    #[error("Invalid detection parameters: {0}")]
    InvalidParams(String),
}

/// Anything that can find faces in an RGB raster.
pub trait FaceDetector {
    /// Face boxes in `img` pixel coordinates, in detector order.
    fn detect(&self, img: &RgbImage) -> Result<Vec<Rect>, DetectError>;
}

/// Tuning knobs for the multi-scale scan.
///
/// Defaults match the values the stock frontal-face cascade is usually run
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionParams {
    /// Pyramid step between scales; must be greater than 1.
    pub scale_factor: f64,
    /// A face needs more than this many overlapping hits. 0 keeps raw hits.
    pub min_neighbors: u32,
    /// Smallest face, in working-raster pixels.
    pub min_face_size: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 30,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(DetectError::InvalidParams(format!(
                "scale_factor must be a finite value greater than 1, got {}",
                self.scale_factor
            )));
        }
        if self.min_face_size == 0 {
            return Err(DetectError::InvalidParams(
                "min_face_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
