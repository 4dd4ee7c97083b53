//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they decide
//! what the backend should do and then call it.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within;
use image::RgbImage;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Scale a freshly loaded raster to fit the target box.
///
/// Consumes the original so it is released as soon as the working raster
/// exists. Rasters already inside the box are returned as-is without a
/// resampling pass.
pub fn working_raster(
    backend: &impl ImageBackend,
    original: RgbImage,
    target: Dimensions,
) -> RgbImage {
    let source = original.dimensions();
    let (width, height) = fit_within(source, (target.width, target.height));
    if (width, height) == source {
        return original;
    }
    backend.resize(&original, width, height)
}

/// Encode a raster and write it to `path`, replacing any existing file.
pub fn write_encoded(backend: &impl ImageBackend, img: &RgbImage, path: &Path) -> Result<()> {
    let bytes = backend.encode(img)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
