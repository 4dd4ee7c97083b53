//! Raster operations in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` (format sniffed from content) |
//! | **Resize** | `fit_within` + Lanczos3 resample |
//! | **Outline** | `imageproc::drawing::draw_hollow_rect_mut` |
//! | **Crop** | `image::imageops::crop_imm` (borrowed view) |
//! | **Encode** | lossless WebP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Annotate**: outline drawing and crop views on the working raster
//! - **Operations**: High-level functions combining calculations + backend

pub mod annotate;
pub mod backend;
mod calculations;
pub mod operations;
pub mod rust_backend;

pub use annotate::{OUTLINE_COLOR, OUTLINE_WIDTH, crop_view, draw_outline};
pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_within;
pub use operations::{working_raster, write_encoded};
pub use rust_backend::{
    OUTPUT_EXTENSION, RustBackend, is_supported_input, supported_input_extensions,
};
