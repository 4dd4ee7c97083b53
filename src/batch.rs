//! Batch driver: every image in the input directory, one at a time.
//!
//! ```text
//! input/                    output/
//! ├── beach.jpg      →      ├── output_beach.jpg.webp
//! ├── empty.png             ├── beach_face_1.webp
//! ├── notes.txt             ├── output_team.webp.webp
//! └── team.webp      →      ├── team_face_1.webp
//!                           └── team_face_2.webp
//! ```
//!
//! Only regular files directly inside the input directory with a decodable
//! image extension are picked up, in file-name order (`notes.txt` above is
//! ignored, `empty.png` has no faces and writes nothing). A file that fails to
//! load, detect or write is reported and skipped; the batch carries on.
//! Only a missing input directory or an uncreatable output directory abort
//! the run.
//!
//! Output names are planned for the whole batch up front, so inputs sharing a
//! base name (`a.bmp`, `a.png`) get distinct crop names.

use crate::config::Config;
use crate::detect::FaceDetector;
use crate::imaging::{ImageBackend, is_supported_input};
use crate::naming;
use crate::pipeline::{FileOutcome, process_image};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input directory not found: {}", .0.display())]
    InputDirMissing(PathBuf),
    #[error("Cannot read input directory: {0}")]
    InputDir(#[from] walkdir::Error),
    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress reported once per file, in processing order.
///
/// `index` is 1-based; `total` is the number of files found.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        input_dir: PathBuf,
        total: usize,
    },
    FileProcessed {
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },
    NoFaces {
        index: usize,
        total: usize,
        input: PathBuf,
    },
    FileFailed {
        index: usize,
        total: usize,
        input: PathBuf,
        error: String,
    },
}

/// Counters for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files_seen: usize,
    pub with_faces: usize,
    pub without_faces: usize,
    pub failed: usize,
    pub total_faces: usize,
}

impl BatchSummary {
    /// Files that went through the pipeline without an error.
    pub fn processed(&self) -> usize {
        self.with_faces + self.without_faces
    }
}

/// Image files directly inside `input_dir`, sorted by file name.
pub fn enumerate_inputs(input_dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::InputDirMissing(input_dir.to_path_buf()));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            inputs.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "not an input image, skipping");
        }
    }
    Ok(inputs)
}

/// Process every input image described by `config`.
///
/// `on_event` is called before the first file and after each file. Per-file
/// errors are reported through it and do not stop the batch.
pub fn run_batch(
    backend: &impl ImageBackend,
    detector: &impl FaceDetector,
    config: &Config,
    mut on_event: impl FnMut(&BatchEvent),
) -> Result<BatchSummary, BatchError> {
    let inputs = enumerate_inputs(&config.input_dir)?;
    std::fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let total = inputs.len();
    on_event(&BatchEvent::Started {
        input_dir: config.input_dir.clone(),
        total,
    });

    let plan = naming::plan_outputs(&config.output_dir, &inputs);
    let mut summary = BatchSummary::default();
    for (i, (input, outputs)) in inputs.into_iter().zip(plan).enumerate() {
        let index = i + 1;
        summary.files_seen += 1;
        if outputs.crop_base != naming::base_name(&input) {
            debug!(
                path = %input.display(),
                crop_base = %outputs.crop_base,
                "base name shared, crops renamed"
            );
        }

        let event = match process_image(backend, detector, &input, &outputs, config.target()) {
            Ok(outcome) if outcome.has_face() => {
                summary.with_faces += 1;
                summary.total_faces += outcome.faces;
                BatchEvent::FileProcessed {
                    index,
                    total,
                    outcome,
                }
            }
            Ok(_) => {
                summary.without_faces += 1;
                BatchEvent::NoFaces {
                    index,
                    total,
                    input,
                }
            }
            Err(e) => {
                warn!(path = %input.display(), error = %e, "skipping file");
                summary.failed += 1;
                BatchEvent::FileFailed {
                    index,
                    total,
                    input,
                    error: e.to_string(),
                }
            }
        };
        on_event(&event);
    }

    debug!(?summary, "batch finished");
    Ok(summary)
}
