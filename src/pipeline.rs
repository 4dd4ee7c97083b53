//! Per-image face pipeline.
//!
//! ```text
//! load → fit to target box → detect → for each face:
//!                                        expand + clamp
//!                                        draw outline on working raster
//!                                        crop view → encode → write <base>_face_<i>.webp
//!                                     → encode annotated raster → write
//! ```
//!
//! The working raster is owned by [`process_image`] and mutated in place by
//! annotation. Each face is drawn *before* it is cropped, so crop `i` shows its
//! own outline plus the outlines of faces `1..i` that overlap it, never those
//! of later faces.
//!
//! An image with no detections produces no files at all.

use crate::detect::{DetectError, FaceDetector};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, crop_view, draw_outline, working_raster,
    write_encoded,
};
use crate::naming::OutputTargets;
use crate::region::{Bounds, Rect};
use image::{RgbImage, SubImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Face detection failed: {0}")]
    Detect(#[from] DetectError),
}

/// What one input produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Annotated image, written only when at least one face was found.
    pub annotated: Option<PathBuf>,
    /// Crop files in detector order.
    pub crops: Vec<PathBuf>,
    pub faces: usize,
}

impl FileOutcome {
    pub fn has_face(&self) -> bool {
        self.faces > 0
    }
}

/// Run the full pipeline on one input file.
///
/// The annotated image and crops are written where `outputs` says.
pub fn process_image(
    backend: &impl ImageBackend,
    detector: &impl FaceDetector,
    input: &Path,
    outputs: &OutputTargets,
    target: Dimensions,
) -> Result<FileOutcome, PipelineError> {
    let original = backend.load(input)?;
    let source = original.dimensions();
    let mut working = working_raster(backend, original, target);

    let faces = detector.detect(&working)?;
    debug!(
        path = %input.display(),
        source_width = source.0,
        source_height = source.1,
        width = working.width(),
        height = working.height(),
        faces = faces.len(),
        "detection finished"
    );

    let mut outcome = FileOutcome {
        input: input.to_path_buf(),
        annotated: None,
        crops: Vec::new(),
        faces: faces.len(),
    };
    if faces.is_empty() {
        return Ok(outcome);
    }

    annotate_and_crop(&mut working, &faces, |index, view| {
        let path = outputs.face_path(index);
        write_encoded(backend, &view.to_image(), &path)?;
        outcome.crops.push(path);
        Ok::<_, BackendError>(())
    })?;

    write_encoded(backend, &working, &outputs.annotated)?;
    outcome.annotated = Some(outputs.annotated.clone());
    Ok(outcome)
}

/// Expand, outline and crop every face in detector order.
///
/// `emit` receives the 1-based face index and a view of the working raster
/// taken right after that face's outline was drawn. Returns the expanded
/// regions. Stops at the first error from `emit`; outlines drawn so far stay
/// on the raster.
pub fn annotate_and_crop<E>(
    working: &mut RgbImage,
    faces: &[Rect],
    mut emit: impl FnMut(usize, SubImage<&RgbImage>) -> Result<(), E>,
) -> Result<Vec<Rect>, E> {
    let bounds = Bounds::from(&*working);
    let mut regions = Vec::with_capacity(faces.len());

    for (i, face) in faces.iter().enumerate() {
        let region = face.expand_for_crop(bounds);
        draw_outline(working, &region);
        emit(i + 1, crop_view(working, &region))?;
        regions.push(region);
    }
    Ok(regions)
}
