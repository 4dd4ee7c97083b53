//! # facecrop
//!
//! Batch face detection for photo collections. Every image is scaled to a
//! working size, faces are found with an OpenCV Haar cascade, each face is
//! outlined in red on the working image and cut out with generous padding,
//! and everything is written as lossless WebP.
//!
//! # Pipeline
//!
//! ```text
//! input/photo.jpg
//!   │ load (image)                       RGB8 raster
//!   │ fit within 1024×1024 (Lanczos3)    working raster
//!   │ detect (Haar cascade)              face boxes, working coordinates
//!   │ for each face:
//!   │     expand + clamp                 padded region
//!   │     draw outline (in place)        red, 3 px
//!   │     crop view → WebP               output/photo_face_<i>.webp
//!   └ annotated raster → WebP            output/output_photo.jpg.webp
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Enumerates the input directory and runs the pipeline per file |
//! | [`pipeline`] | One image: load → fit → detect → annotate + crop → write |
//! | [`region`] | `Rect` geometry: crop expansion and clamping |
//! | [`detect`] | `FaceDetector` trait and the pure-Rust Haar cascade detector |
//! | [`imaging`] | Load, resize, outline, crop and lossless encode |
//! | [`naming`] | Output file names derived from input names |
//! | [`config`] | `facecrop.toml` loading, layering with CLI flags, validation |
//! | [`output`] | CLI output formatting for batch progress and the single-image log |
//!
//! # Design Decisions
//!
//! ## One Rectangle, Two Uses
//!
//! Each detection is expanded once (half a face to each side and above, a
//! full face below) and that single clamped rectangle is both outlined and
//! cropped. The outline therefore always frames the crop exactly.
//!
//! ## Annotate, Then Crop
//!
//! The working raster is mutated in place. Face `i` is outlined before it is
//! cropped, so its crop carries its own frame and any earlier frames that
//! overlap it. Later faces have not been drawn yet.
//!
//! ## Aspect-Preserving Fit
//!
//! Inputs are shrunk to fit the target box with their aspect ratio intact and
//! are never enlarged. All face coordinates refer to this working raster.
//!
//! ## Pure-Rust Detection
//!
//! The cascade evaluator reads the stock OpenCV XML directly, so no OpenCV
//! installation is needed. The same classifier files work unchanged.

pub mod batch;
pub mod config;
pub mod detect;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod region;

#[cfg(test)]
pub(crate) mod test_helpers;
