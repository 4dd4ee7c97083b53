//! Shared test utilities for the facecrop test suite.
//!
//! Provides synthetic rasters, on-disk image fixtures and tiny cascade
//! definitions so detector tests run without the stock OpenCV XML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("a.jpg"), 64, 48);
//!
//! let cascade = HaarCascade::parse(EDGE_CASCADE_XML).unwrap();
//! ```

use image::{Rgb, RgbImage};
use std::path::Path;

// =========================================================================
// Rasters
// =========================================================================

/// Deterministic RGB gradient, distinct per pixel for small sizes.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x % 256) as u8,
            (y % 256) as u8,
            ((x * 7 + y * 13) % 256) as u8,
        ])
    })
}

/// Write a gradient JPEG of the given size.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Count pixels exactly equal to `color`.
pub fn count_pixels(img: &RgbImage, color: Rgb<u8>) -> usize {
    img.pixels().filter(|p| **p == color).count()
}

// =========================================================================
// Cascades
// =========================================================================

/// One-stage 8x8 cascade that fires on windows brighter on the right half.
///
/// The single feature computes `right - left` (full window at -1, right half
/// at +2); the stump passes when the normalized value reaches 0.1.
pub const EDGE_CASCADE_XML: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade>
  <stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>8</height>
  <width>8</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 0.1</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          0 0 8 8 -1.</_>
        <_>
          4 0 4 8 2.</_></rects></_></features></cascade>
</opencv_storage>
"#;

/// Single-stage 8x8 cascade with one single-rectangle feature.
///
/// `extra_feature_xml` is inserted inside the feature element, for example
/// `<tilted>1</tilted>`.
pub fn cascade_xml(
    stage_type: &str,
    feature_type: &str,
    rect_text: &str,
    extra_feature_xml: &str,
) -> String {
    format!(
        r#"<?xml version="1.0"?>
<opencv_storage>
<cascade>
  <stageType>{stage_type}</stageType>
  <featureType>{feature_type}</featureType>
  <height>8</height>
  <width>8</width>
  <stageNum>1</stageNum>
  <stages>
    <_>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>0 -1 0 0.5</internalNodes>
          <leafValues>-1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>{rect_text}</_></rects>{extra_feature_xml}</_></features></cascade>
</opencv_storage>
"#
    )
}
