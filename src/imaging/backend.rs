//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three raster operations the pipeline
//! needs: load, resize and encode. Drawing and cropping are plain functions in
//! [`annotate`](super::annotate) because they never touch a codec.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend) below, which records every call.

use image::RgbImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Width and height of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Raster capabilities consumed by the face pipeline.
pub trait ImageBackend {
    /// Read and decode an image file into an RGB raster.
    fn load(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Resample to exactly `width × height`.
    fn resize(&self, img: &RgbImage, width: u32, height: u32) -> RgbImage;

    /// Serialize to the lossless output format.
    fn encode(&self, img: &RgbImage) -> Result<Vec<u8>, BackendError>;
}
